//! Notification trigger evaluation.
//!
//! A periodic sweep scans goals for two conditions: the deadline has arrived
//! without its notification, or the target has been reached without its
//! notification. Each matching goal produces exactly one event, dispatched
//! through the [`Notifier`] collaborator; the corresponding sent-flag flips
//! to true only after a successful dispatch and never resets, so every goal
//! receives at most one notification per condition.

use crate::{
    core::account,
    entities::{FinancialGoal, financial_goal},
    errors::Result,
    money,
};
use chrono::NaiveDate;
use sea_orm::{Condition, Set, prelude::*};

/// Which condition fired for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTrigger {
    /// The goal's deadline has passed or passes today
    DeadlineReached,
    /// The goal's progress has reached its target
    GoalAchieved,
}

/// One dispatched notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// The goal the notification is about
    pub goal_id: i64,
    /// Delivery address: the owning account's user reference
    pub recipient: String,
    /// Notification subject line
    pub subject: String,
    /// Notification body text
    pub body: String,
    /// The condition that fired
    pub trigger: NotificationTrigger,
}

/// External delivery collaborator. The engine only produces events; getting
/// them to the user (email, push, webhook) happens behind this seam.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Delivers one notification. An error leaves the goal's sent-flag
    /// untouched so the sweep retries on its next run.
    async fn notify(&self, event: &NotificationEvent) -> Result<()>;
}

fn build_event(
    goal: &financial_goal::Model,
    recipient: String,
    trigger: NotificationTrigger,
) -> NotificationEvent {
    let (subject, body) = match trigger {
        NotificationTrigger::DeadlineReached => (
            format!("Goal deadline reached: {}", goal.title),
            format!(
                "Your goal \"{}\" reached its deadline on {} at {} of {} saved.",
                goal.title,
                goal.deadline,
                money::format_cents(goal.current_progress_cents),
                money::format_cents(goal.target_amount_cents),
            ),
        ),
        NotificationTrigger::GoalAchieved => (
            format!("Goal achieved: {}", goal.title),
            format!(
                "Congratulations! Your goal \"{}\" reached its target of {}.",
                goal.title,
                money::format_cents(goal.target_amount_cents),
            ),
        ),
    };
    NotificationEvent {
        goal_id: goal.id,
        recipient,
        subject,
        body,
        trigger,
    }
}

/// Daily sweep: dispatches pending deadline/achievement notifications.
///
/// When both conditions hold for a goal, the deadline notification wins this
/// sweep; the achievement notification follows on the next run. Failures on
/// one goal are logged and the batch continues. Returns the events that were
/// successfully dispatched and flagged.
pub async fn evaluate_notification_triggers<N>(
    db: &DatabaseConnection,
    notifier: &N,
    today: NaiveDate,
) -> Result<Vec<NotificationEvent>>
where
    N: Notifier,
{
    let candidates = FinancialGoal::find()
        .filter(financial_goal::Column::IsDeleted.eq(false))
        .filter(
            Condition::any()
                .add(financial_goal::Column::DeadlineNotificationSent.eq(false))
                .add(financial_goal::Column::AchievedNotificationSent.eq(false)),
        )
        .all(db)
        .await?;

    let mut dispatched = Vec::new();
    for goal in candidates {
        let goal_id = goal.id;
        match process_goal(db, notifier, goal, today).await {
            Ok(Some(event)) => dispatched.push(event),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(goal_id, error = %e, "notification dispatch failed");
            }
        }
    }

    Ok(dispatched)
}

async fn process_goal<N>(
    db: &DatabaseConnection,
    notifier: &N,
    goal: financial_goal::Model,
    today: NaiveDate,
) -> Result<Option<NotificationEvent>>
where
    N: Notifier,
{
    let deadline_due = goal.deadline <= today && !goal.deadline_notification_sent;
    let achieved_due = goal.current_progress_cents >= goal.target_amount_cents
        && !goal.achieved_notification_sent;

    // Deadline takes priority when both conditions fire at once.
    let trigger = if deadline_due {
        NotificationTrigger::DeadlineReached
    } else if achieved_due {
        NotificationTrigger::GoalAchieved
    } else {
        return Ok(None);
    };

    let owner = account::get_account(db, goal.account_id).await?;
    let event = build_event(&goal, owner.user_id, trigger);

    notifier.notify(&event).await?;

    // Flip the flag only after delivery succeeded; monotonic, never reset.
    let mut active_model: financial_goal::ActiveModel = goal.into();
    match trigger {
        NotificationTrigger::DeadlineReached => {
            active_model.deadline_notification_sent = Set(true);
        }
        NotificationTrigger::GoalAchieved => {
            active_model.achieved_notification_sent = Set(true);
        }
    }
    active_model.update(db).await?;

    Ok(Some(event))
}
