//! Database configuration module for `ShopDesk`.
//!
//! This module handles the record store's `SQLite` connection and table creation using
//! `SeaORM`. Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! Creation is idempotent (`IF NOT EXISTS`), which lets the binary run it on every start.

use crate::entities::{
    Account, Admin, AffiliateEvent, Creator, CreatorSample, RevenueEntry, SaleEntry, Shop,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Default database location when neither settings nor `DATABASE_URL` provide one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/shopdesk.sqlite?mode=rwc";

/// Establishes a connection to the record store at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to record store at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every collection table that does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Admin).await?;
    create_table(db, &schema, Shop).await?;
    create_table(db, &schema, RevenueEntry).await?;
    create_table(db, &schema, SaleEntry).await?;
    create_table(db, &schema, Creator).await?;
    create_table(db, &schema, CreatorSample).await?;
    create_table(db, &schema, AffiliateEvent).await?;
    create_table(db, &schema, Account).await?;

    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    debug!("Ensuring table `{}` exists", entity.table_name());
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
