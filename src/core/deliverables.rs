//! Deliverable vault business logic - files handed to the client.
//!
//! Expiry is a read-time classification over a caller-supplied clock: once a
//! deliverable's `expires_at` has passed, its download link is withheld while
//! the metadata stays visible. The first download is recorded exactly once;
//! later calls are no-ops by construction.

use crate::{
    core::activity::log_activity,
    entities::{ActorType, Deliverable, Order, deliverable},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde_json::json;
use tracing::debug;

/// Expiry timestamp for a deliverable, from its delivery time and validity.
///
/// `None` validity means the link never expires.
#[must_use]
pub fn compute_expiry(
    delivered_at: DateTimeUtc,
    validity_days: Option<i64>,
) -> Option<DateTimeUtc> {
    validity_days.map(|days| delivered_at + Duration::days(days))
}

/// Read-time expiry classification at the caller-supplied clock.
///
/// Monotonic: once expired at some instant, expired at every later instant.
#[must_use]
pub fn is_expired(deliverable: &deliverable::Model, now: DateTimeUtc) -> bool {
    deliverable.expires_at.is_some_and(|expires| expires < now)
}

/// The download link, unless access has lapsed.
///
/// Returns `None` for an expired deliverable; its metadata (name, size,
/// delivery date) remains on the model for display.
#[must_use]
pub fn download_link(deliverable: &deliverable::Model, now: DateTimeUtc) -> Option<&str> {
    if is_expired(deliverable, now) {
        None
    } else {
        Some(&deliverable.file_url)
    }
}

/// Splits deliverables into finals and partials for presentation.
#[must_use]
pub fn partition(
    deliverables: &[deliverable::Model],
) -> (Vec<&deliverable::Model>, Vec<&deliverable::Model>) {
    deliverables.iter().partition(|d| d.is_final)
}

/// Retrieves an order's deliverables, newest first.
pub async fn get_deliverables_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<deliverable::Model>> {
    Deliverable::find()
        .filter(deliverable::Column::OrderId.eq(order_id))
        .order_by_desc(deliverable::Column::DeliveredAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a delivered file on an order.
///
/// Expiry is computed from the delivery time and the validity window; pass
/// `None` validity for a link that never lapses.
pub async fn add_deliverable(
    db: &DatabaseConnection,
    order_id: i64,
    file_name: String,
    file_url: String,
    file_type: Option<String>,
    file_size: Option<i64>,
    is_final: bool,
    validity_days: Option<i64>,
) -> Result<deliverable::Model> {
    let txn = db.begin().await?;

    Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            id: order_id.to_string(),
        })?;

    let now = Utc::now();
    let created = deliverable::ActiveModel {
        order_id: Set(order_id),
        file_name: Set(file_name.clone()),
        file_url: Set(file_url),
        file_type: Set(file_type),
        file_size: Set(file_size),
        is_final: Set(is_final),
        delivered_at: Set(now),
        expires_at: Set(compute_expiry(now, validity_days)),
        downloaded_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    log_activity(
        &txn,
        order_id,
        if is_final {
            "final_deliverable_added"
        } else {
            "partial_deliverable_added"
        },
        ActorType::Admin,
        None,
        json!({ "file_name": file_name, "is_final": is_final }),
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Records the client's first download of a deliverable.
///
/// First-download-wins: `downloaded_at` is set only while it is null, via a
/// conditional update, so retries and repeat downloads never move the
/// timestamp and are not errors.
pub async fn mark_downloaded(
    db: &DatabaseConnection,
    deliverable_id: i64,
) -> Result<deliverable::Model> {
    let txn = db.begin().await?;

    let current = Deliverable::find_by_id(deliverable_id)
        .one(&txn)
        .await?
        .ok_or(Error::DeliverableNotFound { id: deliverable_id })?;

    if current.downloaded_at.is_some() {
        debug!(deliverable_id, "repeat download, timestamp kept");
        return Ok(current);
    }

    let order_id = current.order_id;
    let now = Utc::now();

    let stamped = Deliverable::update_many()
        .col_expr(deliverable::Column::DownloadedAt, Expr::value(Some(now)))
        .filter(deliverable::Column::Id.eq(deliverable_id))
        .filter(deliverable::Column::DownloadedAt.is_null())
        .exec(&txn)
        .await?;

    // Only the request that actually set the timestamp logs the download.
    if stamped.rows_affected > 0 {
        log_activity(
            &txn,
            order_id,
            "deliverable_downloaded",
            ActorType::Client,
            None,
            json!({ "file_name": current.file_name }),
        )
        .await?;
    }

    let refreshed = Deliverable::find_by_id(deliverable_id)
        .one(&txn)
        .await?
        .ok_or(Error::DeliverableNotFound { id: deliverable_id })?;

    txn.commit().await?;
    Ok(refreshed)
}
