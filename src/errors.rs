//! Unified error types for the engine.
//!
//! Every error carries enough context to identify the failing entity, and
//! [`Error::kind`] classifies each variant into the coarse taxonomy callers
//! branch on (validation vs. not-found vs. conflict), so transports can map
//! errors to status codes without string matching.

use thiserror::Error;

/// Coarse, machine-checkable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    Validation,
    /// A referenced account, budget, or goal does not exist
    NotFound,
    /// The operation clashes with existing state
    Conflict,
    /// The storage collaborator failed
    Storage,
    /// Configuration or environment problem
    Config,
}

/// All errors produced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the configuration problem
        message: String,
    },

    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    #[error("Invalid amount: {amount_cents} cents")]
    InvalidAmount {
        /// The rejected amount, in cents
        amount_cents: i64,
    },

    #[error("Insufficient funds: {available_cents} cents available, {requested_cents} cents requested")]
    InsufficientFunds {
        /// Funds available on the source, in cents
        available_cents: i64,
        /// Funds the caller asked to move, in cents
        requested_cents: i64,
    },

    #[error("Account not found: {account_id}")]
    AccountNotFound {
        /// The missing account's id
        account_id: i64,
    },

    #[error("Financial goal not found: {goal_id}")]
    GoalNotFound {
        /// The missing goal's id
        goal_id: i64,
    },

    #[error("No active budget found for account {account_id}")]
    NoActiveBudget {
        /// The account without an active budget
        account_id: i64,
    },

    #[error("An active budget already exists for account {account_id}")]
    ActiveBudgetExists {
        /// The account that already has an active budget
        account_id: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classifies this error into the coarse taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InsufficientFunds { .. } => ErrorKind::Validation,
            Self::AccountNotFound { .. }
            | Self::GoalNotFound { .. }
            | Self::NoActiveBudget { .. } => ErrorKind::NotFound,
            Self::ActiveBudgetExists { .. } => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Storage,
            Self::Config { .. } | Self::Io(_) => ErrorKind::Config,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
