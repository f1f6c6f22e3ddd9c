//! Report generation business logic.
//!
//! Builds structured summaries over an account's budget and goals. All
//! functions return plain data for a transport or rendering layer to format;
//! decimal rendering of the cents fields is left to the serialization
//! boundary.

use crate::{
    core::{budget, goal},
    entities::{budget as budget_entity, financial_goal},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Spending summary for one budget period.
#[derive(Debug, Clone)]
pub struct BudgetReport {
    /// The budget being reported on
    pub budget: budget_entity::Model,
    /// Remaining envelopes minus the negative balance; negative when
    /// over-budget
    pub budget_balance_cents: i64,
    /// Cents spent so far this period, including unfunded overspend
    pub spent_cents: i64,
    /// Share of the budget consumed, as a percentage (may exceed 100)
    pub utilization_percent: f64,
}

/// Progress summary for one goal.
#[derive(Debug, Clone)]
pub struct GoalReport {
    /// The goal being reported on
    pub goal: financial_goal::Model,
    /// Progress toward target as a percentage (capped at 100)
    pub progress_percent: f64,
    /// Cents still missing to the target (zero once reached)
    pub remaining_cents: i64,
    /// Days until the deadline; negative once it has passed
    pub days_until_deadline: i64,
}

/// Combined account summary.
#[derive(Debug, Clone)]
pub struct AccountReport {
    /// The account's net balance in cents
    pub net_balance_cents: i64,
    /// Active budget summary, when a period is running
    pub budget: Option<BudgetReport>,
    /// One summary per non-deleted goal, nearest deadline first
    pub goals: Vec<GoalReport>,
    /// Sum of progress across the non-deleted goals
    pub total_goal_progress_cents: i64,
}

/// Progress toward a target as a percentage, capped to `[0, 100]`.
#[must_use]
pub fn calculate_progress(progress_cents: i64, target_cents: i64) -> f64 {
    if target_cents <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = progress_cents as f64 / target_cents as f64;
    (ratio * 100.0).clamp(0.0, 100.0)
}

/// Builds a [`BudgetReport`] for one budget.
#[must_use]
pub fn build_budget_report(model: budget_entity::Model) -> BudgetReport {
    let balance = budget::budget_balance(&model);
    let spent = model.budget_amount_cents - balance;
    #[allow(clippy::cast_precision_loss)]
    let utilization = if model.budget_amount_cents > 0 {
        spent as f64 / model.budget_amount_cents as f64 * 100.0
    } else {
        0.0
    };
    BudgetReport {
        budget: model,
        budget_balance_cents: balance,
        spent_cents: spent,
        utilization_percent: utilization,
    }
}

/// Generates the combined report for an account.
pub async fn generate_account_report(
    db: &DatabaseConnection,
    account_id: i64,
    today: NaiveDate,
) -> Result<AccountReport> {
    let account = crate::core::account::get_account(db, account_id).await?;

    let active_budget = match budget::get_active_budget(db, account_id).await {
        Ok(model) => Some(build_budget_report(model)),
        Err(crate::errors::Error::NoActiveBudget { .. }) => None,
        Err(e) => return Err(e),
    };

    let goals = goal::get_active_goals_for_account(db, account_id).await?;
    let total_goal_progress_cents = goals.iter().map(|g| g.current_progress_cents).sum();
    let goal_reports = goals
        .into_iter()
        .map(|g| {
            let progress_percent =
                calculate_progress(g.current_progress_cents, g.target_amount_cents);
            let remaining_cents = (g.target_amount_cents - g.current_progress_cents).max(0);
            let days_until_deadline = (g.deadline - today).num_days();
            GoalReport {
                goal: g,
                progress_percent,
                remaining_cents,
                days_until_deadline,
            }
        })
        .collect();

    Ok(AccountReport {
        net_balance_cents: account.net_balance_cents,
        budget: active_budget,
        goals: goal_reports,
        total_goal_progress_cents,
    })
}
