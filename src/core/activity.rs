//! Activity log business logic.
//!
//! Every mutating operation in the core records what it did here, inside its
//! own transaction, so the log can never show an action whose write was rolled
//! back. Entries are append-only; there is no update or delete path.

use crate::{
    entities::{Activity, ActorType, activity},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Appends one entry to an order's activity log.
///
/// Generic over the connection so callers can log inside an open transaction
/// alongside the write being described.
///
/// # Arguments
/// * `conn` - Database connection or open transaction
/// * `order_id` - Order the action happened to
/// * `action` - Action key, e.g. `"installment_paid"`
/// * `actor_type` - Which kind of actor performed the action
/// * `actor_id` - Identifier of the acting user, when known
/// * `details` - Free-form key/value context
pub async fn log_activity<C>(
    conn: &C,
    order_id: i64,
    action: &str,
    actor_type: ActorType,
    actor_id: Option<String>,
    details: serde_json::Value,
) -> Result<activity::Model>
where
    C: ConnectionTrait,
{
    let entry = activity::ActiveModel {
        order_id: Set(order_id),
        action: Set(action.to_string()),
        actor_type: Set(actor_type),
        actor_id: Set(actor_id),
        details: Set(details),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = entry.insert(conn).await?;
    Ok(result)
}

/// Retrieves the full activity log for an order, newest entries first.
pub async fn get_activity_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<activity::Model>> {
    Activity::find()
        .filter(activity::Column::OrderId.eq(order_id))
        .order_by_desc(activity::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
