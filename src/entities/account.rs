//! Account entity - Represents a user's financial account.
//!
//! Each account owns a net balance, an allocation rule splitting budgets into
//! needs/wants/savings percentages, and a flag guarding the one-active-budget
//! invariant. Budgets, goals, and savings logs all hang off an account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the owning user; also the notification recipient
    pub user_id: String,
    /// Account type: `"individual"`, `"family"`, `"trader"`, or `"business"`
    pub account_type: String,
    /// Subscription plan: `"basic"` or `"premium"`
    pub plan: String,
    /// When the current subscription lapses, if one is active
    pub subscription_ends_on: Option<Date>,
    /// Net balance in cents, adjusted by income and expense events
    pub net_balance_cents: i64,
    /// Needs share of the allocation rule, in whole percent
    pub needs_percent: i32,
    /// Wants share of the allocation rule, in whole percent
    pub wants_percent: i32,
    /// Savings share of the allocation rule, in whole percent
    pub savings_percent: i32,
    /// Whether an active budget currently exists for this account
    pub budget_active: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many budgets (at most one active)
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
    /// One account has many financial goals
    #[sea_orm(has_many = "super::financial_goal::Entity")]
    FinancialGoals,
    /// One account has many savings logs
    #[sea_orm(has_many = "super::savings_log::Entity")]
    SavingsLogs,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::financial_goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialGoals.def()
    }
}

impl Related<super::savings_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
