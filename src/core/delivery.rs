//! Token-addressed delivery business logic - the public handover channel.
//!
//! A delivery wraps an order's handover behind a random token the client can
//! open without logging in. Two independent conditions withhold access and
//! both are always checked: the link expiring (computed from the send time
//! and the validity window) and an admin revoking it. Revocation is permanent
//! and survives any expiry-date change.

use crate::{
    core::activity::log_activity,
    entities::{ActorType, Delivery, Order, delivery},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Creates a draft delivery for an order with a fresh access token.
///
/// The token is minted here and never changes; the link only becomes usable
/// once the delivery is sent.
pub async fn create_delivery(
    db: &DatabaseConnection,
    order_id: i64,
    message: Option<String>,
    external_link: Option<String>,
    validity_days: i32,
) -> Result<delivery::Model> {
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            id: order_id.to_string(),
        })?;

    let now = Utc::now();
    let created = delivery::ActiveModel {
        order_id: Set(order_id),
        protocol: Set(order.protocol),
        status: Set(delivery::DeliveryStatus::Draft),
        token: Set(Uuid::new_v4().simple().to_string()),
        message: Set(message),
        external_link: Set(external_link),
        validity_days: Set(validity_days),
        expires_at: Set(None),
        sent_at: Set(None),
        access_count: Set(0),
        download_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(created)
}

/// Looks a delivery up by its public access token.
pub async fn get_delivery_by_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<delivery::Model>> {
    Delivery::find()
        .filter(delivery::Column::Token.eq(token))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sends a delivery: stamps `sent_at` and starts the validity window.
///
/// Sending an already-sent delivery is an idempotent no-op so a retried send
/// cannot extend the expiry.
///
/// # Errors
/// Fails with [`Error::DeliveryRevoked`] on a revoked delivery - revocation
/// is permanent and a re-send must not resurrect the link.
pub async fn send_delivery(db: &DatabaseConnection, delivery_id: i64) -> Result<delivery::Model> {
    let txn = db.begin().await?;

    let record = Delivery::find_by_id(delivery_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::DeliveryNotFound {
            id: delivery_id.to_string(),
        })?;

    if record.revoked_at.is_some() {
        return Err(Error::DeliveryRevoked { id: delivery_id });
    }
    if record.status == delivery::DeliveryStatus::Sent {
        return Ok(record);
    }

    let order_id = record.order_id;
    let validity = i64::from(record.validity_days);
    let now = Utc::now();

    let mut active: delivery::ActiveModel = record.into();
    active.status = Set(delivery::DeliveryStatus::Sent);
    active.sent_at = Set(Some(now));
    active.expires_at = Set(Some(now + Duration::days(validity)));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    log_activity(
        &txn,
        order_id,
        "delivery_sent",
        ActorType::Admin,
        None,
        json!({ "validity_days": validity }),
    )
    .await?;

    txn.commit().await?;
    info!(delivery_id, order_id, "delivery sent");
    Ok(updated)
}

/// Revokes a delivery, permanently.
///
/// Revoking an already-revoked delivery keeps the original revocation
/// untouched and returns the record unchanged.
pub async fn revoke_delivery(
    db: &DatabaseConnection,
    delivery_id: i64,
    revoked_by: String,
) -> Result<delivery::Model> {
    let txn = db.begin().await?;

    let record = Delivery::find_by_id(delivery_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::DeliveryNotFound {
            id: delivery_id.to_string(),
        })?;

    if record.revoked_at.is_some() {
        return Ok(record);
    }

    let order_id = record.order_id;
    let now = Utc::now();

    let mut active: delivery::ActiveModel = record.into();
    active.status = Set(delivery::DeliveryStatus::Revoked);
    active.revoked_at = Set(Some(now));
    active.revoked_by = Set(Some(revoked_by.clone()));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    log_activity(
        &txn,
        order_id,
        "delivery_revoked",
        ActorType::Admin,
        Some(revoked_by),
        json!({}),
    )
    .await?;

    txn.commit().await?;
    info!(delivery_id, order_id, "delivery revoked");
    Ok(updated)
}

/// Read-time expiry classification at the caller-supplied clock.
#[must_use]
pub fn is_delivery_expired(record: &delivery::Model, now: DateTimeUtc) -> bool {
    record.expires_at.is_some_and(|expires| expires < now)
}

/// Whether the public token still grants access.
///
/// The delivery must have been sent, must not be revoked, and must not be
/// expired. Revocation and expiry are independent conditions; both are
/// checked on every access.
#[must_use]
pub fn is_token_valid(record: &delivery::Model, now: DateTimeUtc) -> bool {
    record.status == delivery::DeliveryStatus::Sent
        && record.revoked_at.is_none()
        && !is_delivery_expired(record, now)
}

/// The public URL for a delivery, built from the configured base.
#[must_use]
pub fn access_link(record: &delivery::Model, base_url: &str) -> String {
    format!("{}/delivery/{}", base_url.trim_end_matches('/'), record.token)
}

/// Records one open of the public delivery page.
///
/// Counter bookkeeping only; access gating is the caller's check via
/// [`is_token_valid`]. The increment is a single atomic update.
pub async fn record_access(
    db: &DatabaseConnection,
    delivery_id: i64,
) -> Result<delivery::Model> {
    bump_counter(db, delivery_id, delivery::Column::AccessCount).await
}

/// Records one download through the delivery.
pub async fn record_download(
    db: &DatabaseConnection,
    delivery_id: i64,
) -> Result<delivery::Model> {
    bump_counter(db, delivery_id, delivery::Column::DownloadCount).await
}

/// Atomic counter increment: `count = count + 1` in one statement, so
/// concurrent opens never lose updates.
async fn bump_counter(
    db: &DatabaseConnection,
    delivery_id: i64,
    column: delivery::Column,
) -> Result<delivery::Model> {
    let now = Utc::now();

    let result = Delivery::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .col_expr(delivery::Column::LastAccessAt, Expr::value(Some(now)))
        .filter(delivery::Column::Id.eq(delivery_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::DeliveryNotFound {
            id: delivery_id.to_string(),
        });
    }

    Delivery::find_by_id(delivery_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::DeliveryNotFound {
            id: delivery_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_delivery_mints_token() -> Result<()> {
        let (db, order) = setup_with_order().await?;

        let a = create_delivery(&db, order.id, None, None, 7).await?;
        let b = create_delivery(&db, order.id, None, None, 7).await?;

        assert_eq!(a.status, delivery::DeliveryStatus::Draft);
        assert_eq!(a.protocol, order.protocol);
        assert_eq!(a.token.len(), 32);
        assert_ne!(a.token, b.token);

        let found = get_delivery_by_token(&db, &a.token).await?;
        assert_eq!(found.unwrap().id, a.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_send_starts_validity_window() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let draft = create_delivery(&db, order.id, None, None, 7).await?;

        let sent = send_delivery(&db, draft.id).await?;
        assert_eq!(sent.status, delivery::DeliveryStatus::Sent);
        let sent_at = sent.sent_at.unwrap();
        assert_eq!(sent.expires_at, Some(sent_at + Duration::days(7)));

        // Re-sending does not extend the window.
        let again = send_delivery(&db, draft.id).await?;
        assert_eq!(again.expires_at, sent.expires_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_token_validity_checks_both_conditions() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let draft = create_delivery(&db, order.id, None, None, 7).await?;

        // Draft token grants nothing.
        assert!(!is_token_valid(&draft, utc(2024, 1, 1)));

        let sent = send_delivery(&db, draft.id).await?;
        let sent_at = sent.sent_at.unwrap();
        assert!(is_token_valid(&sent, sent_at + Duration::days(6)));

        // Expired: the link lapses even without revocation.
        assert!(!is_token_valid(&sent, sent_at + Duration::days(8)));

        // Revoked: invalid even well inside the validity window.
        let revoked = revoke_delivery(&db, sent.id, "admin-1".to_string()).await?;
        assert!(!is_token_valid(&revoked, sent_at + Duration::days(1)));

        Ok(())
    }

    #[tokio::test]
    async fn test_revocation_is_permanent_and_idempotent() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let draft = create_delivery(&db, order.id, None, None, 7).await?;
        send_delivery(&db, draft.id).await?;

        let revoked = revoke_delivery(&db, draft.id, "admin-1".to_string()).await?;
        assert!(revoked.revoked_at.is_some());
        assert_eq!(revoked.revoked_by, Some("admin-1".to_string()));

        // A second revocation keeps the original record.
        let again = revoke_delivery(&db, draft.id, "admin-2".to_string()).await?;
        assert_eq!(again.revoked_at, revoked.revoked_at);
        assert_eq!(again.revoked_by, Some("admin-1".to_string()));

        // A re-send cannot resurrect the link.
        let result = send_delivery(&db, draft.id).await;
        assert!(matches!(result.unwrap_err(), Error::DeliveryRevoked { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_access_counters() -> Result<()> {
        let (db, order) = setup_with_order().await?;
        let draft = create_delivery(&db, order.id, None, None, 7).await?;
        send_delivery(&db, draft.id).await?;

        record_access(&db, draft.id).await?;
        record_access(&db, draft.id).await?;
        let after = record_download(&db, draft.id).await?;

        assert_eq!(after.access_count, 2);
        assert_eq!(after.download_count, 1);
        assert!(after.last_access_at.is_some());

        Ok(())
    }

    #[test]
    fn test_access_link_formatting() {
        let mut record = delivery_fixture("ORD-0001");
        record.token = "abc123".to_string();

        assert_eq!(
            access_link(&record, "https://studio.example/track/"),
            "https://studio.example/track/delivery/abc123"
        );
    }
}
