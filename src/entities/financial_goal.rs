//! Financial goal entity - A monetary target tracked over time.
//!
//! Progress accumulates through savings logs and transfers. `status` moves
//! from `"ongoing"` to `"completed"` exactly once and never back, even if a
//! later transfer drops progress below the target. Goals are soft-deleted
//! via `is_deleted` and the notification flags are monotonic false-to-true.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Financial goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the account this goal belongs to
    pub account_id: i64,
    /// Human-readable goal title (e.g., "Emergency fund")
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Goal type: `"savings"`, `"investment"`, `"retirement"`,
    /// `"debt_repayment"`, or `"other"`
    pub goal_type: String,
    /// Target amount in cents, always positive
    pub target_amount_cents: i64,
    /// Accumulated progress in cents, never negative
    pub current_progress_cents: i64,
    /// Date the goal should be reached by
    pub deadline: Date,
    /// Goal status: `"ongoing"` or `"completed"` (one-way transition)
    pub status: String,
    /// Soft delete flag - if true, goal is hidden but data is preserved
    pub is_deleted: bool,
    /// Whether a fixed contribution is applied on a schedule
    pub is_recurring: bool,
    /// Contribution schedule: `"daily"`, `"weekly"`, `"monthly"`, or
    /// `"yearly"`; present exactly when `is_recurring` is true
    pub frequency: Option<String>,
    /// Fixed auto-contribution in cents; present exactly when recurring
    pub recurring_amount_cents: Option<i64>,
    /// Whether the deadline-reached notification has been dispatched
    pub deadline_notification_sent: bool,
    /// Whether the goal-achieved notification has been dispatched
    pub achieved_notification_sent: bool,
    /// When the goal was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between FinancialGoal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each goal belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    /// One goal has many savings logs
    #[sea_orm(has_many = "super::savings_log::Entity")]
    SavingsLogs,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::savings_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
