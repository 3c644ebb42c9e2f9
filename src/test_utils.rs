//! Shared test utilities for the order desk.
//!
//! Provides the in-memory database setup, entity factories with sensible
//! defaults, and pure model fixtures for tests that never touch the database.

#![allow(clippy::unwrap_used)]

use crate::{
    config,
    entities::{self, ActorType, InstallmentStatus, OrderStatus, PaymentMode, RevisionStatus},
    errors::Result,
};
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use serde_json::json;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Midnight UTC on the given date, for deterministic clock inputs.
#[must_use]
pub fn utc(year: i32, month: u32, day: u32) -> DateTimeUtc {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Creates a test order with sensible defaults.
///
/// # Defaults
/// * `status`: `briefing`
/// * `payment_mode`: `split_50_50`
/// * `quoted_value`: 100 000 minor units
/// * `max_revisions`: 2
/// * `briefing_completeness_score`: 90
pub async fn create_test_order(
    db: &DatabaseConnection,
    protocol: &str,
) -> Result<entities::order::Model> {
    create_custom_order(db, protocol, OrderStatus::Briefing, Some(100_000)).await
}

/// Creates a test order with a specific status and quoted value.
pub async fn create_custom_order(
    db: &DatabaseConnection,
    protocol: &str,
    status: OrderStatus,
    quoted_value: Option<i64>,
) -> Result<entities::order::Model> {
    let now = Utc::now();
    let order = entities::order::ActiveModel {
        protocol: Set(protocol.to_string()),
        client_id: Set(None),
        status: Set(status),
        payment_mode: Set(PaymentMode::Split5050),
        quoted_value: Set(quoted_value),
        max_revisions: Set(2),
        revision_count: Set(0),
        briefing_completeness_score: Set(90),
        briefing_at: Set(now),
        quote_sent_at: Set(None),
        approved_at: Set(None),
        payment_confirmed_at: Set(None),
        final_deadline: Set(None),
        delivered_at: Set(None),
        final_payment_at: Set(None),
        public_token: Set(None),
        archived_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = order.insert(db).await?;
    Ok(result)
}

/// Sets up a complete test environment with an order.
/// Returns (db, order) for common test scenarios.
pub async fn setup_with_order() -> Result<(DatabaseConnection, entities::order::Model)> {
    let db = setup_test_db().await?;
    let order = create_test_order(&db, "ORD-0001").await?;
    Ok((db, order))
}

/// Inserts an installment row directly, bypassing the plan builder.
/// Use this to stage specific ledger states.
pub async fn create_custom_installment(
    db: &DatabaseConnection,
    order_id: i64,
    installment_number: i32,
    amount: i64,
    status: InstallmentStatus,
) -> Result<entities::installment::Model> {
    let now = Utc::now();
    let installment = entities::installment::ActiveModel {
        order_id: Set(order_id),
        installment_number: Set(installment_number),
        amount: Set(amount),
        due_date: Set(now),
        status: Set(status),
        payment_method: Set(None),
        proof_url: Set(None),
        paid_at: Set(if status == InstallmentStatus::Paid {
            Some(now)
        } else {
            None
        }),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = installment.insert(db).await?;
    Ok(result)
}

/// Inserts a revision row directly, bypassing the counter path.
/// Use this to stage inconsistent ledgers for integrity checks.
pub async fn create_test_revision(
    db: &DatabaseConnection,
    order_id: i64,
    revision_number: i32,
) -> Result<entities::revision::Model> {
    let revision = entities::revision::ActiveModel {
        order_id: Set(order_id),
        revision_number: Set(revision_number),
        description: Set("Test revision".to_string()),
        requested_by: Set(entities::RequestedBy::Client),
        status: Set(RevisionStatus::Pending),
        is_extra: Set(false),
        extra_cost: Set(0),
        admin_response: Set(None),
        created_at: Set(Utc::now()),
        resolved_at: Set(None),
        ..Default::default()
    };

    let result = revision.insert(db).await?;
    Ok(result)
}

/// Pure installment model for tests that never touch the database.
#[must_use]
pub fn installment_fixture(
    installment_number: i32,
    amount: i64,
    status: InstallmentStatus,
) -> entities::installment::Model {
    let day_one = utc(2024, 1, 1);
    entities::installment::Model {
        id: i64::from(installment_number),
        order_id: 1,
        installment_number,
        amount,
        due_date: day_one,
        status,
        payment_method: None,
        proof_url: None,
        paid_at: if status == InstallmentStatus::Paid {
            Some(utc(2024, 1, 15))
        } else {
            None
        },
        created_at: day_one,
        updated_at: day_one,
    }
}

/// Pure deliverable model for tests that never touch the database.
#[must_use]
pub fn deliverable_fixture(file_name: &str, is_final: bool) -> entities::deliverable::Model {
    let day_one = utc(2024, 1, 1);
    entities::deliverable::Model {
        id: 1,
        order_id: 1,
        file_name: file_name.to_string(),
        file_url: format!("file://{file_name}"),
        file_type: None,
        file_size: None,
        is_final,
        delivered_at: day_one,
        expires_at: None,
        downloaded_at: None,
        created_at: day_one,
    }
}

/// Pure delivery model for tests that never touch the database.
#[must_use]
pub fn delivery_fixture(protocol: &str) -> entities::delivery::Model {
    let day_one = utc(2024, 1, 1);
    entities::delivery::Model {
        id: 1,
        order_id: 1,
        protocol: protocol.to_string(),
        status: entities::DeliveryStatus::Draft,
        token: "test-token".to_string(),
        message: None,
        external_link: None,
        validity_days: 7,
        expires_at: None,
        sent_at: None,
        access_count: 0,
        download_count: 0,
        last_access_at: None,
        revoked_at: None,
        revoked_by: None,
        created_at: day_one,
        updated_at: day_one,
    }
}

/// Pure activity model for tests that never touch the database.
#[must_use]
pub fn activity_fixture(
    id: i64,
    action: &str,
    actor_type: ActorType,
    created_at: DateTimeUtc,
) -> entities::activity::Model {
    entities::activity::Model {
        id,
        order_id: 1,
        action: action.to_string(),
        actor_type,
        actor_id: None,
        details: json!({}),
        created_at,
    }
}
