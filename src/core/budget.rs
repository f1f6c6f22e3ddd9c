//! Budget engine business logic.
//!
//! A budget period is activated with a total amount, split into
//! needs/wants/savings envelopes by the account's allocation rule, then
//! drained by expenses in a fixed waterfall order. Expenses beyond all
//! envelopes accumulate in the budget's negative balance so overspend is
//! auditable rather than hidden. Each account has at most one active budget;
//! a new period can only start once the previous one is deactivated.

use crate::{
    core::account,
    entities::{Budget, budget},
    errors::{Error, Result},
    money,
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Envelope state produced by [`apply_waterfall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterfallOutcome {
    /// Cents left in the needs envelope
    pub needs_remaining_cents: i64,
    /// Cents left in the wants envelope
    pub wants_remaining_cents: i64,
    /// Cents left in the savings envelope
    pub savings_remaining_cents: i64,
    /// Accumulated overspend magnitude after the deduction
    pub negative_balance_cents: i64,
}

/// Applies an expense to the envelopes in fixed priority order
/// needs -> wants -> savings -> negative balance.
///
/// Each envelope is floored at zero; whatever the envelopes cannot fund is
/// added to the negative balance. Pure function so the cascade is testable
/// without persistence, and so the engine persists its result as one atomic
/// whole-row update.
#[must_use]
pub fn apply_waterfall(
    needs_remaining_cents: i64,
    wants_remaining_cents: i64,
    savings_remaining_cents: i64,
    negative_balance_cents: i64,
    amount_cents: i64,
) -> WaterfallOutcome {
    let mut remaining = amount_cents;

    let from_needs = needs_remaining_cents.min(remaining);
    remaining -= from_needs;

    let from_wants = wants_remaining_cents.min(remaining);
    remaining -= from_wants;

    let from_savings = savings_remaining_cents.min(remaining);
    remaining -= from_savings;

    WaterfallOutcome {
        needs_remaining_cents: needs_remaining_cents - from_needs,
        wants_remaining_cents: wants_remaining_cents - from_wants,
        savings_remaining_cents: savings_remaining_cents - from_savings,
        negative_balance_cents: negative_balance_cents + remaining,
    }
}

/// Returns the last calendar day of `date`'s month.
#[must_use]
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// Remaining spending room of a budget: the envelope remainders minus the
/// accumulated negative balance. Negative when the period is over-budget.
#[must_use]
pub const fn budget_balance(budget: &budget::Model) -> i64 {
    budget.needs_remaining_cents + budget.wants_remaining_cents + budget.savings_remaining_cents
        - budget.negative_balance_cents
}

async fn find_active_budget<C>(db: &C, account_id: i64) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::AccountId.eq(account_id))
        .filter(budget::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Activates a new budget period for the account.
///
/// Splits the amount into envelopes by the account's allocation rule (the
/// rounding remainder lands in savings so the envelopes always sum to the
/// amount exactly), sets the period to run from today to the last day of the
/// current calendar month, and flips the account's budget flag. Fails with
/// `ActiveBudgetExists` when a period is already running.
pub async fn activate_budget(
    db: &DatabaseConnection,
    account_id: i64,
    budget_amount_cents: i64,
) -> Result<budget::Model> {
    if budget_amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount_cents: budget_amount_cents,
        });
    }

    let txn = db.begin().await?;

    let owner = account::get_account(&txn, account_id).await?;
    if owner.budget_active || find_active_budget(&txn, account_id).await?.is_some() {
        return Err(Error::ActiveBudgetExists { account_id });
    }

    let (needs, wants, savings) = money::split_three_way(
        budget_amount_cents,
        owner.needs_percent,
        owner.wants_percent,
        owner.savings_percent,
    );

    let start_date = Utc::now().date_naive();
    let model = budget::ActiveModel {
        account_id: Set(account_id),
        budget_amount_cents: Set(budget_amount_cents),
        needs_allocated_cents: Set(needs),
        wants_allocated_cents: Set(wants),
        savings_allocated_cents: Set(savings),
        needs_remaining_cents: Set(needs),
        wants_remaining_cents: Set(wants),
        savings_remaining_cents: Set(savings),
        negative_balance_cents: Set(0),
        start_date: Set(start_date),
        end_date: Set(last_day_of_month(start_date)),
        is_active: Set(true),
        ..Default::default()
    };

    let created = model.insert(&txn).await?;
    account::set_budget_active(&txn, account_id, true).await?;

    txn.commit().await?;
    Ok(created)
}

/// Deducts an expense from the active budget via the envelope waterfall and
/// decrements the account's net balance by the same amount.
///
/// The cascade result is persisted as a single whole-row update inside one
/// transaction, so no reader ever observes a partially applied waterfall.
pub async fn deduct_expense(
    db: &DatabaseConnection,
    account_id: i64,
    amount_cents: i64,
) -> Result<budget::Model> {
    if amount_cents <= 0 {
        return Err(Error::InvalidAmount { amount_cents });
    }

    let txn = db.begin().await?;

    let current = find_active_budget(&txn, account_id)
        .await?
        .ok_or(Error::NoActiveBudget { account_id })?;

    let outcome = apply_waterfall(
        current.needs_remaining_cents,
        current.wants_remaining_cents,
        current.savings_remaining_cents,
        current.negative_balance_cents,
        amount_cents,
    );

    let mut active_model: budget::ActiveModel = current.into();
    active_model.needs_remaining_cents = Set(outcome.needs_remaining_cents);
    active_model.wants_remaining_cents = Set(outcome.wants_remaining_cents);
    active_model.savings_remaining_cents = Set(outcome.savings_remaining_cents);
    active_model.negative_balance_cents = Set(outcome.negative_balance_cents);
    let updated = active_model.update(&txn).await?;

    account::adjust_net_balance(&txn, account_id, -amount_cents).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Fetches the account's active budget, failing with `NoActiveBudget` when
/// none is running.
pub async fn get_active_budget(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<budget::Model> {
    find_active_budget(db, account_id)
        .await?
        .ok_or(Error::NoActiveBudget { account_id })
}

/// Deactivates the account's active budget before its period ends.
pub async fn cancel_budget(db: &DatabaseConnection, account_id: i64) -> Result<budget::Model> {
    let txn = db.begin().await?;

    let current = find_active_budget(&txn, account_id)
        .await?
        .ok_or(Error::NoActiveBudget { account_id })?;

    let mut active_model: budget::ActiveModel = current.into();
    active_model.is_active = Set(false);
    let updated = active_model.update(&txn).await?;
    account::set_budget_active(&txn, account_id, false).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Periodic sweep deactivating every budget whose period has ended.
///
/// A budget expires once `end_date` lies strictly before `today`. Each budget
/// is processed in its own transaction; a failure on one is logged and the
/// sweep continues with the rest. Running the sweep twice is a no-op the
/// second time.
pub async fn deactivate_expired_budgets(db: &DatabaseConnection, today: NaiveDate) -> Result<usize> {
    let expired = Budget::find()
        .filter(budget::Column::IsActive.eq(true))
        .filter(budget::Column::EndDate.lt(today))
        .all(db)
        .await?;

    let mut deactivated = 0;
    for item in expired {
        let budget_id = item.id;
        match deactivate_one(db, item).await {
            Ok(()) => deactivated += 1,
            Err(e) => {
                tracing::error!(budget_id, error = %e, "failed to deactivate expired budget");
            }
        }
    }

    Ok(deactivated)
}

async fn deactivate_one(db: &DatabaseConnection, item: budget::Model) -> Result<()> {
    let txn = db.begin().await?;
    let account_id = item.account_id;

    let mut active_model: budget::ActiveModel = item.into();
    active_model.is_active = Set(false);
    active_model.update(&txn).await?;
    account::set_budget_active(&txn, account_id, false).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_waterfall_partial_cascade() {
        // 10000 split 50/30/20, spend 6000: needs drains fully, wants covers
        // the remaining 1000, savings untouched.
        let outcome = apply_waterfall(5000, 3000, 2000, 0, 6000);
        assert_eq!(
            outcome,
            WaterfallOutcome {
                needs_remaining_cents: 0,
                wants_remaining_cents: 2000,
                savings_remaining_cents: 2000,
                negative_balance_cents: 0,
            }
        );

        // Follow-up spend of 2500 against the drained state.
        let outcome = apply_waterfall(0, 2000, 2000, 0, 2500);
        assert_eq!(
            outcome,
            WaterfallOutcome {
                needs_remaining_cents: 0,
                wants_remaining_cents: 0,
                savings_remaining_cents: 1500,
                negative_balance_cents: 0,
            }
        );
    }

    #[test]
    fn test_waterfall_overflow_accumulates_negative_balance() {
        let outcome = apply_waterfall(100, 50, 25, 0, 500);
        assert_eq!(outcome.needs_remaining_cents, 0);
        assert_eq!(outcome.wants_remaining_cents, 0);
        assert_eq!(outcome.savings_remaining_cents, 0);
        assert_eq!(outcome.negative_balance_cents, 325);

        // Already overspent: the whole amount lands on the negative balance.
        let outcome = apply_waterfall(0, 0, 0, 325, 175);
        assert_eq!(outcome.negative_balance_cents, 500);
    }

    #[test]
    fn test_waterfall_conserves_every_cent() {
        let cases = [
            (5000, 3000, 2000, 0, 6000),
            (0, 2000, 2000, 0, 2500),
            (1, 1, 1, 0, 10),
            (0, 0, 0, 7, 13),
            (100, 0, 100, 50, 100),
        ];
        for (needs, wants, savings, negative, amount) in cases {
            let outcome = apply_waterfall(needs, wants, savings, negative, amount);
            let drained = (needs + wants + savings)
                - (outcome.needs_remaining_cents
                    + outcome.wants_remaining_cents
                    + outcome.savings_remaining_cents);
            let overflowed = outcome.negative_balance_cents - negative;
            assert_eq!(drained + overflowed, amount);
            assert!(outcome.needs_remaining_cents >= 0);
            assert!(outcome.wants_remaining_cents >= 0);
            assert!(outcome.savings_remaining_cents >= 0);
        }
    }

    #[test]
    fn test_last_day_of_month() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(last_day_of_month(date(2026, 1, 15)), date(2026, 1, 31));
        assert_eq!(last_day_of_month(date(2026, 2, 1)), date(2026, 2, 28));
        assert_eq!(last_day_of_month(date(2028, 2, 10)), date(2028, 2, 29));
        assert_eq!(last_day_of_month(date(2026, 12, 31)), date(2026, 12, 31));
    }

    #[tokio::test]
    async fn test_activate_budget_splits_by_allocation_rule() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;

        let budget = activate_budget(&db, account.id, 10_000).await?;
        assert_eq!(budget.needs_allocated_cents, 5_000);
        assert_eq!(budget.wants_allocated_cents, 3_000);
        assert_eq!(budget.savings_allocated_cents, 2_000);
        assert_eq!(budget.needs_remaining_cents, 5_000);
        assert_eq!(budget.negative_balance_cents, 0);
        assert!(budget.is_active);
        assert_eq!(budget.end_date, last_day_of_month(budget.start_date));

        let account = crate::core::account::get_account(&db, account.id).await?;
        assert!(account.budget_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_activate_budget_reconciles_rounding_into_savings() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;
        crate::core::account::set_allocation_rule(&db, account.id, 33, 33, 34).await?;

        let budget = activate_budget(&db, account.id, 1_000).await?;
        assert_eq!(budget.needs_allocated_cents, 330);
        assert_eq!(budget.wants_allocated_cents, 330);
        assert_eq!(budget.savings_allocated_cents, 340);
        assert_eq!(
            budget.needs_allocated_cents
                + budget.wants_allocated_cents
                + budget.savings_allocated_cents,
            budget.budget_amount_cents
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_activate_budget_rejects_duplicates_and_bad_amounts() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;

        let result = activate_budget(&db, account.id, 0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        activate_budget(&db, account.id, 10_000).await?;
        let result = activate_budget(&db, account.id, 5_000).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ActiveBudgetExists { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_expense_cascades_and_updates_net_balance() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;
        crate::core::account::adjust_net_balance(&db, account.id, 20_000).await?;
        activate_budget(&db, account.id, 10_000).await?;

        let budget = deduct_expense(&db, account.id, 6_000).await?;
        assert_eq!(budget.needs_remaining_cents, 0);
        assert_eq!(budget.wants_remaining_cents, 2_000);
        assert_eq!(budget.savings_remaining_cents, 2_000);
        assert_eq!(budget.negative_balance_cents, 0);

        let budget = deduct_expense(&db, account.id, 2_500).await?;
        assert_eq!(budget.wants_remaining_cents, 0);
        assert_eq!(budget.savings_remaining_cents, 1_500);
        assert_eq!(budget.negative_balance_cents, 0);
        assert_eq!(budget_balance(&budget), 1_500);

        let account = crate::core::account::get_account(&db, account.id).await?;
        assert_eq!(account.net_balance_cents, 20_000 - 6_000 - 2_500);
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_expense_overspend_goes_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;
        activate_budget(&db, account.id, 1_000).await?;

        let budget = deduct_expense(&db, account.id, 1_500).await?;
        assert_eq!(budget.needs_remaining_cents, 0);
        assert_eq!(budget.wants_remaining_cents, 0);
        assert_eq!(budget.savings_remaining_cents, 0);
        assert_eq!(budget.negative_balance_cents, 500);
        assert_eq!(budget_balance(&budget), -500);
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_expense_requires_active_budget() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;

        let result = deduct_expense(&db, account.id, 100).await;
        assert!(matches!(result.unwrap_err(), Error::NoActiveBudget { .. }));

        let result = deduct_expense(&db, account.id, -100).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_budget_allows_new_activation() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;

        activate_budget(&db, account.id, 10_000).await?;
        let cancelled = cancel_budget(&db, account.id).await?;
        assert!(!cancelled.is_active);

        // The account is free for a fresh period now.
        let budget = activate_budget(&db, account.id, 4_000).await?;
        assert!(budget.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_expired_budgets_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;
        let budget = activate_budget(&db, account.id, 10_000).await?;

        // The day after the period ends, the sweep deactivates it; running
        // the sweep again finds nothing left to do.
        let next_day = budget.end_date.succ_opt().unwrap();
        assert_eq!(deactivate_expired_budgets(&db, next_day).await?, 1);
        assert_eq!(deactivate_expired_budgets(&db, next_day).await?, 0);

        let result = get_active_budget(&db, account.id).await;
        assert!(matches!(result.unwrap_err(), Error::NoActiveBudget { .. }));

        let account = crate::core::account::get_account(&db, account.id).await?;
        assert!(!account.budget_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_expired_spares_running_budgets() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db).await?;
        let budget = activate_budget(&db, account.id, 10_000).await?;

        // On the end date itself the period has not passed yet.
        assert_eq!(deactivate_expired_budgets(&db, budget.end_date).await?, 0);
        assert!(get_active_budget(&db, account.id).await?.is_active);
        Ok(())
    }
}
