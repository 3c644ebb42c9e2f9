//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated with `Schema::create_table_from_entity` so the database
//! schema always matches the entity definitions without hand-written SQL.

use crate::entities::{Activity, Deliverable, Delivery, Installment, Order, Revision};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/order_desk.sqlite".to_string())
}

/// Establishes a connection using the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Uses `SeaORM`'s schema generation so the SQL always matches the Rust
/// struct definitions: orders, installments, revisions, deliverables,
/// deliveries, and the activity log.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let order_table = schema.create_table_from_entity(Order);
    let installment_table = schema.create_table_from_entity(Installment);
    let revision_table = schema.create_table_from_entity(Revision);
    let deliverable_table = schema.create_table_from_entity(Deliverable);
    let delivery_table = schema.create_table_from_entity(Delivery);
    let activity_table = schema.create_table_from_entity(Activity);

    db.execute(builder.build(&order_table)).await?;
    db.execute(builder.build(&installment_table)).await?;
    db.execute(builder.build(&revision_table)).await?;
    db.execute(builder.build(&deliverable_table)).await?;
    db.execute(builder.build(&delivery_table)).await?;
    db.execute(builder.build(&activity_table)).await?;

    Ok(())
}
