//! Savings log entity - Append-only audit trail of goal contributions.
//!
//! One row per logged contribution, whether user-initiated or applied by the
//! recurring job. Rows are never mutated or deleted; the recurring job also
//! reads the latest recurring row per goal to derive the next due date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Savings log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "savings_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the account the contribution belongs to
    pub account_id: i64,
    /// ID of the goal the contribution was applied to
    pub goal_id: i64,
    /// Contribution amount in cents, always positive
    pub amount_cents: i64,
    /// The date the contribution counts for
    pub logged_on: Date,
    /// Whether this entry was produced by the recurring job
    pub is_recurring: bool,
    /// Recurrence schedule metadata, when applicable
    pub frequency: Option<String>,
    /// When the row was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between SavingsLog and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log entry belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    /// Each log entry belongs to one goal
    #[sea_orm(
        belongs_to = "super::financial_goal::Entity",
        from = "Column::GoalId",
        to = "super::financial_goal::Column::Id"
    )]
    FinancialGoal,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::financial_goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialGoal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
