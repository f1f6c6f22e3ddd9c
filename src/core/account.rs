//! Account ledger business logic.
//!
//! Owns the per-account allocation rule, the net balance, and the flag that
//! guards the one-active-budget invariant. Balance adjustments go through an
//! atomic database-level update so concurrent income/expense events cannot
//! lose writes.

use crate::{
    entities::{Account, account},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Recognized account types.
pub const ACCOUNT_TYPES: [&str; 4] = ["individual", "family", "trader", "business"];
/// Recognized subscription plans.
pub const PLANS: [&str; 2] = ["basic", "premium"];

/// Creates a new account with a zeroed balance and the default 50/30/20
/// allocation rule.
///
/// The account type and plan must be one of the recognized values; the user
/// reference must be non-empty.
pub async fn create_account(
    db: &DatabaseConnection,
    user_id: String,
    account_type: String,
    plan: String,
) -> Result<account::Model> {
    if user_id.trim().is_empty() {
        return Err(Error::Validation {
            message: "user reference cannot be empty".to_string(),
        });
    }
    if !ACCOUNT_TYPES.contains(&account_type.as_str()) {
        return Err(Error::Validation {
            message: format!("unknown account type: {account_type}"),
        });
    }
    if !PLANS.contains(&plan.as_str()) {
        return Err(Error::Validation {
            message: format!("unknown plan: {plan}"),
        });
    }

    let model = account::ActiveModel {
        user_id: Set(user_id.trim().to_string()),
        account_type: Set(account_type),
        plan: Set(plan),
        subscription_ends_on: Set(None),
        net_balance_cents: Set(0),
        needs_percent: Set(50),
        wants_percent: Set(30),
        savings_percent: Set(20),
        budget_active: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Fetches an account by ID, failing with `AccountNotFound` if absent.
pub async fn get_account<C>(db: &C, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { account_id })
}

/// Replaces the account's allocation rule.
///
/// Each percentage must be in `[0, 100]` and the three must sum to exactly
/// 100, otherwise the rule is rejected without touching the account.
pub async fn set_allocation_rule(
    db: &DatabaseConnection,
    account_id: i64,
    needs_percent: i32,
    wants_percent: i32,
    savings_percent: i32,
) -> Result<account::Model> {
    let parts = [needs_percent, wants_percent, savings_percent];
    if parts.iter().any(|p| !(0..=100).contains(p)) {
        return Err(Error::Validation {
            message: format!(
                "allocation percentages must each be within 0-100, got {needs_percent}/{wants_percent}/{savings_percent}"
            ),
        });
    }
    if needs_percent + wants_percent + savings_percent != 100 {
        return Err(Error::Validation {
            message: format!(
                "allocation percentages must sum to 100, got {}",
                needs_percent + wants_percent + savings_percent
            ),
        });
    }

    let account = get_account(db, account_id).await?;
    let mut active_model: account::ActiveModel = account.into();
    active_model.needs_percent = Set(needs_percent);
    active_model.wants_percent = Set(wants_percent);
    active_model.savings_percent = Set(savings_percent);
    active_model.update(db).await.map_err(Into::into)
}

/// Returns the account's allocation rule as (needs, wants, savings) percent.
pub async fn get_allocation_rule<C>(db: &C, account_id: i64) -> Result<(i32, i32, i32)>
where
    C: ConnectionTrait,
{
    let account = get_account(db, account_id).await?;
    Ok((
        account.needs_percent,
        account.wants_percent,
        account.savings_percent,
    ))
}

/// Adjusts the account's net balance by atomically adding a delta.
///
/// Uses a single SQL UPDATE (`net_balance_cents = net_balance_cents + delta`)
/// instead of a read-modify-write so concurrent adjustments cannot lose
/// updates.
pub async fn adjust_net_balance<C>(
    db: &C,
    account_id: i64,
    delta_cents: i64,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    // First verify the account exists
    let _account = get_account(db, account_id).await?;

    // Perform atomic update: net_balance_cents = net_balance_cents + delta
    Account::update_many()
        .col_expr(
            account::Column::NetBalanceCents,
            Expr::col(account::Column::NetBalanceCents).add(delta_cents),
        )
        .filter(account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    get_account(db, account_id).await
}

/// Sets the account's budget-active flag. Idempotent.
pub async fn set_budget_active<C>(db: &C, account_id: i64, active: bool) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let account = get_account(db, account_id).await?;
    if account.budget_active == active {
        return Ok(account);
    }
    let mut active_model: account::ActiveModel = account.into();
    active_model.budget_active = Set(active);
    active_model.update(db).await.map_err(Into::into)
}
