//! Revision negotiation business logic.
//!
//! Revisions are numbered from the counter on the parent order, never from
//! the row count, and the counter only moves inside the same transaction that
//! inserts the row. The bump is an optimistic guarded update: if another
//! request moved the counter between our read and our write, the whole
//! operation fails with `ConcurrentModification` and the caller retries.
//! Whether a revision is a billable extra is decided once, at creation time,
//! against the pre-increment counter.

use crate::{
    core::activity::log_activity,
    entities::{ActorType, Order, OrderStatus, RequestedBy, Revision, order, revision},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde_json::json;
use tracing::{info, warn};

/// Revisions still included in the order's quota.
#[must_use]
pub fn remaining(order: &order::Model) -> i32 {
    (order.max_revisions - order.revision_count).max(0)
}

/// Whether the included quota is used up; the next request will be an extra.
#[must_use]
pub fn is_exhausted(order: &order::Model) -> bool {
    order.revision_count >= order.max_revisions
}

/// The allowed revision status transition table.
///
/// `pending` may move to any of the three other statuses; `in_progress` may
/// only resolve. Resolved revisions never move again.
#[must_use]
pub const fn allowed_revision_transition(
    from: revision::RevisionStatus,
    to: revision::RevisionStatus,
) -> bool {
    matches!(
        (from, to),
        (
            revision::RevisionStatus::Pending,
            revision::RevisionStatus::InProgress
                | revision::RevisionStatus::Completed
                | revision::RevisionStatus::Rejected
        ) | (
            revision::RevisionStatus::InProgress,
            revision::RevisionStatus::Completed | revision::RevisionStatus::Rejected
        )
    )
}

/// Retrieves an order's revisions in request order.
pub async fn get_revisions_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<revision::Model>> {
    Revision::find()
        .filter(revision::Column::OrderId.eq(order_id))
        .order_by_asc(revision::Column::RevisionNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Requests a new revision on an order.
///
/// Assigns the next sequential number from the order's counter, flags the
/// revision as extra when the included quota was already used up (compared
/// against the counter before the increment), moves the order to
/// `in_revision`, and records the activity - all in one transaction.
///
/// # Errors
/// Fails with [`Error::ConcurrentModification`] when the counter moved
/// between read and write; the caller should retry the whole operation.
pub async fn request_revision(
    db: &DatabaseConnection,
    order_id: i64,
    description: String,
    requested_by: RequestedBy,
) -> Result<revision::Model> {
    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            id: order_id.to_string(),
        })?;

    let observed_count = order.revision_count;
    let is_extra = observed_count >= order.max_revisions;
    let revision_number = observed_count + 1;
    let now = Utc::now();

    let created = revision::ActiveModel {
        order_id: Set(order_id),
        revision_number: Set(revision_number),
        description: Set(description),
        requested_by: Set(requested_by),
        status: Set(revision::RevisionStatus::Pending),
        is_extra: Set(is_extra),
        extra_cost: Set(0),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // Guarded counter bump: only succeeds if nobody moved the counter since
    // we read it. Zero rows affected means a concurrent request won the race.
    let bump = Order::update_many()
        .col_expr(order::Column::RevisionCount, Expr::value(revision_number))
        .col_expr(order::Column::Status, Expr::value(OrderStatus::InRevision))
        .col_expr(order::Column::UpdatedAt, Expr::value(now))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::RevisionCount.eq(observed_count))
        .exec(&txn)
        .await?;

    if bump.rows_affected == 0 {
        warn!(order_id, "revision counter raced, rolling back");
        return Err(Error::ConcurrentModification { order_id });
    }

    log_activity(
        &txn,
        order_id,
        if is_extra {
            "revision_extra_requested"
        } else {
            "revision_requested"
        },
        ActorType::from(requested_by),
        None,
        json!({
            "revision_number": revision_number,
            "is_extra": is_extra,
        }),
    )
    .await?;

    txn.commit().await?;
    info!(order_id, revision_number, is_extra, "revision requested");
    Ok(created)
}

/// Moves a revision through its negotiation states.
///
/// Entering `completed` or `rejected` stamps `resolved_at`; completing a
/// revision also returns the order to `in_production` so the next round of
/// work can start.
///
/// # Errors
/// Fails with [`Error::InvalidRevisionTransition`] for any move outside the
/// allowed table; the revision is left untouched.
pub async fn update_revision_status(
    db: &DatabaseConnection,
    revision_id: i64,
    new_status: revision::RevisionStatus,
    admin_response: Option<String>,
) -> Result<revision::Model> {
    let txn = db.begin().await?;

    let rev = Revision::find_by_id(revision_id)
        .one(&txn)
        .await?
        .ok_or(Error::RevisionNotFound { id: revision_id })?;

    if !allowed_revision_transition(rev.status, new_status) {
        return Err(Error::InvalidRevisionTransition {
            from: rev.status,
            to: new_status,
        });
    }

    let order_id = rev.order_id;
    let revision_number = rev.revision_number;
    let now = Utc::now();

    let mut active: revision::ActiveModel = rev.into();
    active.status = Set(new_status);
    if admin_response.is_some() {
        active.admin_response = Set(admin_response);
    }
    if new_status.is_resolved() {
        active.resolved_at = Set(Some(now));
    }
    let updated = active.update(&txn).await?;

    if new_status == revision::RevisionStatus::Completed {
        Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::InProduction))
            .col_expr(order::Column::UpdatedAt, Expr::value(now))
            .filter(order::Column::Id.eq(order_id))
            .exec(&txn)
            .await?;
    }

    let action = match new_status {
        revision::RevisionStatus::InProgress => "revision_in_progress",
        revision::RevisionStatus::Completed => "revision_completed",
        revision::RevisionStatus::Rejected => "revision_rejected",
        revision::RevisionStatus::Pending => "revision_requested",
    };
    log_activity(
        &txn,
        order_id,
        action,
        ActorType::Admin,
        None,
        json!({ "revision_number": revision_number }),
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}
