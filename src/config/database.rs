//! Database configuration module for `PocketLedger`.
//!
//! Handles `SQLite` database connection and table creation using `SeaORM`.
//! Table creation uses `Schema::create_table_from_entity` so the database
//! schema always matches the entity definitions without hand-written SQL;
//! statements carry `IF NOT EXISTS` so startup is safe against an already
//! initialized database file.

use crate::entities::{Account, Budget, FinancialGoal, SavingsLog};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/pocketledger.sqlite".to_string())
}

/// Establishes a connection to the database at the given URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut account_table = schema.create_table_from_entity(Account);
    let mut budget_table = schema.create_table_from_entity(Budget);
    let mut goal_table = schema.create_table_from_entity(FinancialGoal);
    let mut savings_log_table = schema.create_table_from_entity(SavingsLog);

    db.execute(builder.build(account_table.if_not_exists()))
        .await?;
    db.execute(builder.build(budget_table.if_not_exists())).await?;
    db.execute(builder.build(goal_table.if_not_exists())).await?;
    db.execute(builder.build(savings_log_table.if_not_exists()))
        .await?;

    Ok(())
}
