//! Financial goal engine business logic.
//!
//! Goals accumulate progress through savings logs and transfers. Completion
//! is derived, not stored by hand: a goal flips to `"completed"` the moment
//! progress reaches the target, and the transition is sticky - later
//! withdrawals never revert it. Every contribution leaves an immutable
//! savings log row, which the recurring job also uses to decide when a
//! goal's next scheduled contribution is due.

use crate::{
    core::account,
    entities::{FinancialGoal, SavingsLog, financial_goal, savings_log},
    errors::{Error, Result},
    money,
};
use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Goal status while the target has not been reached.
pub const STATUS_ONGOING: &str = "ongoing";
/// Goal status once the target has been reached. Sticky.
pub const STATUS_COMPLETED: &str = "completed";

/// Recognized goal types.
pub const GOAL_TYPES: [&str; 5] = [
    "savings",
    "investment",
    "retirement",
    "debt_repayment",
    "other",
];

/// Contribution schedule for recurring goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// One interval per day
    Daily,
    /// One interval per seven days
    Weekly,
    /// One interval per calendar month
    Monthly,
    /// One interval per calendar year
    Yearly,
}

impl Frequency {
    /// Parses the stored string form, rejecting unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::Validation {
                message: format!("unknown frequency: {other}"),
            }),
        }
    }

    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The date one interval after `from`.
    #[must_use]
    pub fn next_due(self, from: NaiveDate) -> NaiveDate {
        let next = match self {
            Self::Daily => from.checked_add_days(Days::new(1)),
            Self::Weekly => from.checked_add_days(Days::new(7)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
            Self::Yearly => from.checked_add_months(Months::new(12)),
        };
        next.unwrap_or(from)
    }

    /// Number of whole intervals between `from` and `until`; zero when
    /// `until` is not after `from`.
    #[must_use]
    pub fn intervals_between(self, from: NaiveDate, until: NaiveDate) -> i64 {
        if until <= from {
            return 0;
        }
        match self {
            Self::Daily => (until - from).num_days(),
            Self::Weekly => (until - from).num_days() / 7,
            Self::Monthly => whole_months_between(from, until),
            Self::Yearly => whole_months_between(from, until) / 12,
        }
    }
}

fn whole_months_between(from: NaiveDate, until: NaiveDate) -> i64 {
    let mut months = i64::from(until.year() - from.year()) * 12
        + i64::from(until.month()) - i64::from(from.month());
    if until.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}

/// Derives a goal's status from its progress.
///
/// Completion is one-way: once a goal reports `"completed"` it stays
/// completed regardless of where progress moves afterwards.
#[must_use]
pub fn derive_status(progress_cents: i64, target_cents: i64, current_status: &str) -> &'static str {
    if current_status == STATUS_COMPLETED || progress_cents >= target_cents {
        STATUS_COMPLETED
    } else {
        STATUS_ONGOING
    }
}

fn validate_recurrence(
    is_recurring: bool,
    frequency: Option<&str>,
    recurring_amount_cents: Option<i64>,
) -> Result<()> {
    if is_recurring {
        let frequency = frequency.ok_or_else(|| Error::Validation {
            message: "recurring goals require a frequency".to_string(),
        })?;
        Frequency::parse(frequency)?;
        match recurring_amount_cents {
            Some(amount) if amount > 0 => Ok(()),
            Some(amount) => Err(Error::InvalidAmount {
                amount_cents: amount,
            }),
            None => Err(Error::Validation {
                message: "recurring goals require a contribution amount".to_string(),
            }),
        }
    } else if frequency.is_some() || recurring_amount_cents.is_some() {
        Err(Error::Validation {
            message: "frequency and contribution amount are only valid on recurring goals"
                .to_string(),
        })
    } else {
        Ok(())
    }
}

/// Input for creating a financial goal.
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    /// Owning account ID
    pub account_id: i64,
    /// Goal title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Goal type; defaults to `"savings"` when omitted
    pub goal_type: Option<String>,
    /// Target amount in cents, must be positive
    pub target_amount_cents: i64,
    /// Initial progress in cents, must be non-negative
    pub current_progress_cents: i64,
    /// Deadline, must not lie in the past at creation
    pub deadline: NaiveDate,
    /// Whether a fixed contribution is applied on a schedule
    pub is_recurring: bool,
    /// Schedule for recurring goals, absent otherwise
    pub frequency: Option<String>,
    /// Fixed contribution for recurring goals, absent otherwise
    pub recurring_amount_cents: Option<i64>,
}

/// Creates a financial goal, computing its initial status from the starting
/// progress.
pub async fn create_goal(
    db: &DatabaseConnection,
    input: CreateGoalInput,
) -> Result<financial_goal::Model> {
    if input.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "goal title cannot be empty".to_string(),
        });
    }
    if input.target_amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount_cents: input.target_amount_cents,
        });
    }
    if input.current_progress_cents < 0 {
        return Err(Error::InvalidAmount {
            amount_cents: input.current_progress_cents,
        });
    }
    let goal_type = input.goal_type.unwrap_or_else(|| "savings".to_string());
    if !GOAL_TYPES.contains(&goal_type.as_str()) {
        return Err(Error::Validation {
            message: format!("unknown goal type: {goal_type}"),
        });
    }
    let today = Utc::now().date_naive();
    if input.deadline < today {
        return Err(Error::Validation {
            message: format!("deadline {} is in the past", input.deadline),
        });
    }
    validate_recurrence(
        input.is_recurring,
        input.frequency.as_deref(),
        input.recurring_amount_cents,
    )?;

    account::get_account(db, input.account_id).await?;

    let status = derive_status(
        input.current_progress_cents,
        input.target_amount_cents,
        STATUS_ONGOING,
    );
    let model = financial_goal::ActiveModel {
        account_id: Set(input.account_id),
        title: Set(input.title.trim().to_string()),
        description: Set(input.description),
        goal_type: Set(goal_type),
        target_amount_cents: Set(input.target_amount_cents),
        current_progress_cents: Set(input.current_progress_cents),
        deadline: Set(input.deadline),
        status: Set(status.to_string()),
        is_deleted: Set(false),
        is_recurring: Set(input.is_recurring),
        frequency: Set(input.frequency),
        recurring_amount_cents: Set(input.recurring_amount_cents),
        deadline_notification_sent: Set(false),
        achieved_notification_sent: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

async fn get_owned_goal<C>(db: &C, account_id: i64, goal_id: i64) -> Result<financial_goal::Model>
where
    C: ConnectionTrait,
{
    FinancialGoal::find_by_id(goal_id)
        .filter(financial_goal::Column::AccountId.eq(account_id))
        .filter(financial_goal::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(Error::GoalNotFound { goal_id })
}

/// Applies a savings contribution to a goal and appends the audit log row.
///
/// Progress accumulates, the status is re-derived (an ongoing goal may newly
/// complete; a completed goal stays completed), and both writes happen in one
/// transaction. Returns the updated goal together with the log entry.
pub async fn log_savings(
    db: &DatabaseConnection,
    account_id: i64,
    goal_id: i64,
    amount_cents: i64,
    logged_on: NaiveDate,
    is_recurring: bool,
    frequency: Option<String>,
) -> Result<(financial_goal::Model, savings_log::Model)> {
    if amount_cents <= 0 {
        return Err(Error::InvalidAmount { amount_cents });
    }
    if is_recurring {
        let frequency = frequency.as_deref().ok_or_else(|| Error::Validation {
            message: "recurring contributions require a frequency".to_string(),
        })?;
        Frequency::parse(frequency)?;
    } else if frequency.is_some() {
        return Err(Error::Validation {
            message: "frequency is only valid on recurring contributions".to_string(),
        });
    }

    let txn = db.begin().await?;

    let goal = get_owned_goal(&txn, account_id, goal_id).await?;
    let new_progress = goal.current_progress_cents + amount_cents;
    let new_status = derive_status(new_progress, goal.target_amount_cents, &goal.status);

    let mut active_model: financial_goal::ActiveModel = goal.into();
    active_model.current_progress_cents = Set(new_progress);
    active_model.status = Set(new_status.to_string());
    let updated_goal = active_model.update(&txn).await?;

    let log_model = savings_log::ActiveModel {
        account_id: Set(account_id),
        goal_id: Set(goal_id),
        amount_cents: Set(amount_cents),
        logged_on: Set(logged_on),
        is_recurring: Set(is_recurring),
        frequency: Set(frequency),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let log = log_model.insert(&txn).await?;

    txn.commit().await?;
    Ok((updated_goal, log))
}

/// Moves funds between two goals of the same account atomically.
///
/// The source must hold at least the transfer amount. The destination may
/// newly complete; the source's status is left untouched, so a completed
/// source stays completed even when its progress drops below target.
pub async fn transfer_funds(
    db: &DatabaseConnection,
    account_id: i64,
    source_goal_id: i64,
    destination_goal_id: i64,
    amount_cents: i64,
) -> Result<(financial_goal::Model, financial_goal::Model)> {
    if amount_cents <= 0 {
        return Err(Error::InvalidAmount { amount_cents });
    }
    if source_goal_id == destination_goal_id {
        return Err(Error::Validation {
            message: "cannot transfer a goal's funds to itself".to_string(),
        });
    }

    let txn = db.begin().await?;

    let source = get_owned_goal(&txn, account_id, source_goal_id).await?;
    let destination = get_owned_goal(&txn, account_id, destination_goal_id).await?;

    if source.current_progress_cents < amount_cents {
        return Err(Error::InsufficientFunds {
            available_cents: source.current_progress_cents,
            requested_cents: amount_cents,
        });
    }

    let new_source_progress = source.current_progress_cents - amount_cents;
    let mut source_model: financial_goal::ActiveModel = source.into();
    source_model.current_progress_cents = Set(new_source_progress);
    let updated_source = source_model.update(&txn).await?;

    let new_progress = destination.current_progress_cents + amount_cents;
    let new_status = derive_status(
        new_progress,
        destination.target_amount_cents,
        &destination.status,
    );
    let mut destination_model: financial_goal::ActiveModel = destination.into();
    destination_model.current_progress_cents = Set(new_progress);
    destination_model.status = Set(new_status.to_string());
    let updated_destination = destination_model.update(&txn).await?;

    txn.commit().await?;
    Ok((updated_source, updated_destination))
}

/// Computes the fixed amount to set aside per interval to reach a target by
/// its deadline.
///
/// Pure computation: counts the whole intervals between `today` and the
/// deadline at the given frequency and divides the remaining amount across
/// them, rounding up so the final contribution never undershoots.
pub fn calculate_savings_amount(
    target_amount_cents: i64,
    already_saved_cents: i64,
    deadline: NaiveDate,
    frequency: Frequency,
    today: NaiveDate,
) -> Result<i64> {
    if target_amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount_cents: target_amount_cents,
        });
    }
    if deadline < today {
        return Err(Error::Validation {
            message: format!("deadline {deadline} is in the past"),
        });
    }
    let intervals = frequency.intervals_between(today, deadline);
    if intervals == 0 {
        return Err(Error::Validation {
            message: format!(
                "no whole {} interval fits before {deadline}",
                frequency.as_str()
            ),
        });
    }

    let remaining = (target_amount_cents - already_saved_cents).max(0);
    Ok(money::ceil_div(remaining, intervals))
}

/// Periodic job applying due recurring contributions.
///
/// A recurring goal is due when one frequency interval has elapsed since its
/// latest recurring savings log (or since creation when none exists yet).
/// Each due goal receives exactly one contribution per invocation, recorded
/// through the same path as a manual savings log; failures on one goal are
/// logged and the rest of the batch continues.
pub async fn increment_progress_for_active_goals(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<usize> {
    let goals = FinancialGoal::find()
        .filter(financial_goal::Column::IsRecurring.eq(true))
        .filter(financial_goal::Column::IsDeleted.eq(false))
        .filter(financial_goal::Column::Status.eq(STATUS_ONGOING))
        .all(db)
        .await?;

    let mut applied = 0;
    for goal in goals {
        let goal_id = goal.id;
        match apply_recurring_contribution(db, &goal, today).await {
            Ok(true) => applied += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(goal_id, error = %e, "recurring contribution failed");
            }
        }
    }

    Ok(applied)
}

async fn apply_recurring_contribution(
    db: &DatabaseConnection,
    goal: &financial_goal::Model,
    today: NaiveDate,
) -> Result<bool> {
    let frequency_str = goal.frequency.as_deref().ok_or_else(|| Error::Validation {
        message: format!("recurring goal {} has no frequency", goal.id),
    })?;
    let frequency = Frequency::parse(frequency_str)?;
    let amount_cents = goal
        .recurring_amount_cents
        .ok_or_else(|| Error::Validation {
            message: format!("recurring goal {} has no contribution amount", goal.id),
        })?;

    let latest = SavingsLog::find()
        .filter(savings_log::Column::GoalId.eq(goal.id))
        .filter(savings_log::Column::IsRecurring.eq(true))
        .order_by_desc(savings_log::Column::LoggedOn)
        .one(db)
        .await?;

    let baseline = latest.map_or_else(
        || goal.created_at.date_naive(),
        |log| log.logged_on,
    );
    let due = frequency.next_due(baseline);
    if due > today {
        return Ok(false);
    }

    // The log is dated on the due date, not the run date, so a late sweep
    // does not drift the schedule.
    log_savings(
        db,
        goal.account_id,
        goal.id,
        amount_cents,
        due,
        true,
        Some(frequency.as_str().to_string()),
    )
    .await?;
    Ok(true)
}

/// Sum of current progress across the account's non-deleted goals.
pub async fn get_total_current_progress(db: &DatabaseConnection, account_id: i64) -> Result<i64> {
    let goals = get_active_goals_for_account(db, account_id).await?;
    Ok(goals.iter().map(|g| g.current_progress_cents).sum())
}

/// Retrieves all non-deleted goals for an account, nearest deadline first.
pub async fn get_active_goals_for_account(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<financial_goal::Model>> {
    FinancialGoal::find()
        .filter(financial_goal::Column::AccountId.eq(account_id))
        .filter(financial_goal::Column::IsDeleted.eq(false))
        .order_by_asc(financial_goal::Column::Deadline)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Soft-deletes a goal. The row and its savings logs are preserved.
pub async fn soft_delete_goal(
    db: &DatabaseConnection,
    account_id: i64,
    goal_id: i64,
) -> Result<financial_goal::Model> {
    let goal = get_owned_goal(db, account_id, goal_id).await?;
    let mut active_model: financial_goal::ActiveModel = goal.into();
    active_model.is_deleted = Set(true);
    active_model.update(db).await.map_err(Into::into)
}
