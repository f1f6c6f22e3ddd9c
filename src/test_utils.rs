//! Shared test utilities for `PocketLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{account, goal, notification},
    entities,
    errors::{Error, Result},
};
use chrono::{Days, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test account with sensible defaults.
///
/// # Defaults
/// * `user_id`: "user-1"
/// * `account_type`: "individual"
/// * `plan`: "basic"
/// * allocation rule: 50/30/20
pub async fn create_test_account(db: &DatabaseConnection) -> Result<entities::account::Model> {
    account::create_account(
        db,
        "user-1".to_string(),
        "individual".to_string(),
        "basic".to_string(),
    )
    .await
}

/// Creates a test account with custom parameters.
pub async fn create_custom_account(
    db: &DatabaseConnection,
    user_id: &str,
    account_type: &str,
    plan: &str,
) -> Result<entities::account::Model> {
    account::create_account(
        db,
        user_id.to_string(),
        account_type.to_string(),
        plan.to_string(),
    )
    .await
}

/// Creates a test goal with sensible defaults.
///
/// # Defaults
/// * `target_amount_cents`: 10000
/// * `current_progress_cents`: 0
/// * `deadline`: 90 days from today
pub async fn create_test_goal(
    db: &DatabaseConnection,
    account_id: i64,
    title: &str,
) -> Result<entities::financial_goal::Model> {
    create_custom_goal(db, account_id, title, 10_000, 0).await
}

/// Creates a test goal with a custom target and starting progress.
pub async fn create_custom_goal(
    db: &DatabaseConnection,
    account_id: i64,
    title: &str,
    target_amount_cents: i64,
    current_progress_cents: i64,
) -> Result<entities::financial_goal::Model> {
    goal::create_goal(
        db,
        goal::CreateGoalInput {
            account_id,
            title: title.to_string(),
            description: None,
            goal_type: None,
            target_amount_cents,
            current_progress_cents,
            deadline: Utc::now().date_naive() + Days::new(90),
            is_recurring: false,
            frequency: None,
            recurring_amount_cents: None,
        },
    )
    .await
}

/// Creates a recurring test goal with a fixed contribution schedule.
pub async fn create_recurring_goal(
    db: &DatabaseConnection,
    account_id: i64,
    title: &str,
    frequency: &str,
    recurring_amount_cents: i64,
) -> Result<entities::financial_goal::Model> {
    goal::create_goal(
        db,
        goal::CreateGoalInput {
            account_id,
            title: title.to_string(),
            description: None,
            goal_type: None,
            target_amount_cents: 10_000,
            current_progress_cents: 0,
            deadline: Utc::now().date_naive() + Days::new(730),
            is_recurring: true,
            frequency: Some(frequency.to_string()),
            recurring_amount_cents: Some(recurring_amount_cents),
        },
    )
    .await
}

/// A [`notification::Notifier`] that records every dispatched event, and can
/// be told to fail for one goal to exercise per-entity error handling.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<notification::NotificationEvent>>,
    fail_for_goal: Option<i64>,
}

impl RecordingNotifier {
    /// A notifier that fails delivery for the given goal and records the rest.
    #[must_use]
    pub fn failing_for(goal_id: i64) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for_goal: Some(goal_id),
        }
    }

    /// Everything successfully delivered so far.
    pub fn sent(&self) -> Vec<notification::NotificationEvent> {
        self.sent.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl notification::Notifier for RecordingNotifier {
    async fn notify(&self, event: &notification::NotificationEvent) -> Result<()> {
        if self.fail_for_goal == Some(event.goal_id) {
            return Err(Error::Config {
                message: "simulated delivery failure".to_string(),
            });
        }
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(event.clone());
        }
        Ok(())
    }
}
