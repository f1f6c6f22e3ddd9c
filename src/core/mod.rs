//! Core business logic - framework-agnostic engine operations.
//!
//! Each submodule owns one concern: the account ledger, the budget
//! allocation/deduction engine, the financial goal engine, the notification
//! trigger evaluator, and report generation. All functions are async, take a
//! database connection, and return `Result` types for error handling; the
//! pure computations (waterfall, splits, status derivation, interval math)
//! are plain functions so they stay testable without a database.

/// Account ledger - allocation rule, net balance, budget flag
pub mod account;
/// Budget engine - activation, waterfall deduction, period deactivation
pub mod budget;
/// Financial goal engine - contributions, transfers, recurrence
pub mod goal;
/// Notification trigger evaluator and dispatch seam
pub mod notification;
/// Report generation over budgets and goals
pub mod report;
