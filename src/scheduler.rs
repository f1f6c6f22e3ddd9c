//! Periodic job scheduling.
//!
//! Owns the three recurring sweeps as explicit scheduled tasks: expired
//! budget deactivation, recurring goal contributions, and notification
//! trigger evaluation. Every tick calls an idempotent engine function with
//! the current date, logs the outcome, and swallows the error so one bad
//! tick never kills the loop. Cadences come from [`AppConfig`].

use crate::{
    config::settings::AppConfig,
    core::{budget, goal, notification},
    errors::Result,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{error, info};

/// Default [`notification::Notifier`] used by the scheduler binary: writes
/// every event to the log. A real deployment substitutes the email/push
/// delivery collaborator here.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl notification::Notifier for LogNotifier {
    async fn notify(&self, event: &notification::NotificationEvent) -> Result<()> {
        info!(
            goal_id = event.goal_id,
            recipient = %event.recipient,
            subject = %event.subject,
            "dispatching notification"
        );
        Ok(())
    }
}

/// Runs the periodic jobs until the process is stopped.
///
/// Each interval fires immediately on startup, which is safe because every
/// sweep is idempotent.
pub async fn run<N>(db: DatabaseConnection, config: &AppConfig, notifier: N)
where
    N: notification::Notifier,
{
    // A zero cadence would make `interval` panic; clamp to one second.
    let mut deactivation = tokio::time::interval(Duration::from_secs(
        (config.deactivation_check_hours * 3600).max(1),
    ));
    let mut recurring = tokio::time::interval(Duration::from_secs(
        (config.recurring_check_minutes * 60).max(1),
    ));
    let mut notifications = tokio::time::interval(Duration::from_secs(
        (config.notification_check_hours * 3600).max(1),
    ));

    info!(
        deactivation_check_hours = config.deactivation_check_hours,
        recurring_check_minutes = config.recurring_check_minutes,
        notification_check_hours = config.notification_check_hours,
        "scheduler started"
    );

    loop {
        tokio::select! {
            _ = deactivation.tick() => {
                let today = Utc::now().date_naive();
                match budget::deactivate_expired_budgets(&db, today).await {
                    Ok(count) if count > 0 => info!(count, "deactivated expired budgets"),
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "expired budget sweep failed"),
                }
            }
            _ = recurring.tick() => {
                let today = Utc::now().date_naive();
                match goal::increment_progress_for_active_goals(&db, today).await {
                    Ok(count) if count > 0 => info!(count, "applied recurring contributions"),
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "recurring contribution sweep failed"),
                }
            }
            _ = notifications.tick() => {
                let today = Utc::now().date_naive();
                match notification::evaluate_notification_triggers(&db, &notifier, today).await {
                    Ok(events) if !events.is_empty() => {
                        info!(count = events.len(), "dispatched goal notifications");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "notification sweep failed"),
                }
            }
        }
    }
}
