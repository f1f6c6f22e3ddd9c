//! Budget entity - One envelope-budget period for an account.
//!
//! A budget splits its total amount into needs/wants/savings envelopes.
//! `*_allocated_cents` record the split at activation and never change;
//! `*_remaining_cents` drain as expenses are deducted, never below zero.
//! Overspend beyond all envelopes accumulates in `negative_balance_cents`.
//! At most one budget per account has `is_active = true`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the account this budget belongs to
    pub account_id: i64,
    /// Total budgeted amount in cents
    pub budget_amount_cents: i64,
    /// Cents allocated to the needs envelope at activation
    pub needs_allocated_cents: i64,
    /// Cents allocated to the wants envelope at activation
    pub wants_allocated_cents: i64,
    /// Cents allocated to the savings envelope at activation
    pub savings_allocated_cents: i64,
    /// Cents left in the needs envelope
    pub needs_remaining_cents: i64,
    /// Cents left in the wants envelope
    pub wants_remaining_cents: i64,
    /// Cents left in the savings envelope
    pub savings_remaining_cents: i64,
    /// Accumulated overspend beyond all envelopes, as a non-negative magnitude
    pub negative_balance_cents: i64,
    /// First day of the budget period
    pub start_date: Date,
    /// Last day of the budget period (last calendar day of the start month)
    pub end_date: Date,
    /// Whether this budget is the account's current period
    pub is_active: bool,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
