//! Order bookkeeping - lookups and archiving.
//!
//! Orders are created at briefing submission by the intake surface and are
//! never deleted; an archived order just carries its `archived_at` marker and
//! drops out of the active listing.

use crate::{
    core::activity::log_activity,
    entities::{ActorType, Order, order},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::info;

/// Finds an order by its primary key.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an order by its human-facing protocol.
pub async fn get_order_by_protocol(
    db: &DatabaseConnection,
    protocol: &str,
) -> Result<Option<order::Model>> {
    Order::find()
        .filter(order::Column::Protocol.eq(protocol))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all non-archived orders, newest first.
pub async fn get_active_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::ArchivedAt.is_null())
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Archives an order.
///
/// Idempotent: archiving an already-archived order keeps the original marker
/// and returns the record unchanged.
pub async fn archive_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            id: order_id.to_string(),
        })?;

    if order.archived_at.is_some() {
        return Ok(order);
    }

    let now = Utc::now();
    let mut active: order::ActiveModel = order.into();
    active.archived_at = Set(Some(now));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    log_activity(&txn, order_id, "order_archived", ActorType::Admin, None, json!({})).await?;

    txn.commit().await?;
    info!(order_id, "order archived");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_lookup_by_id_and_protocol() -> Result<()> {
        let (db, order) = setup_with_order().await?;

        let by_id = get_order_by_id(&db, order.id).await?;
        assert_eq!(by_id.unwrap().id, order.id);

        let by_protocol = get_order_by_protocol(&db, &order.protocol).await?;
        assert_eq!(by_protocol.unwrap().id, order.id);

        let missing = get_order_by_protocol(&db, "NO-SUCH").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_archive_hides_from_active_listing() -> Result<()> {
        let db = setup_test_db().await?;
        let kept = create_test_order(&db, "ORD-0001").await?;
        let archived = create_test_order(&db, "ORD-0002").await?;

        archive_order(&db, archived.id).await?;

        let active = get_active_orders(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_archive_is_idempotent() -> Result<()> {
        let (db, order) = setup_with_order().await?;

        let first = archive_order(&db, order.id).await?;
        let second = archive_order(&db, order.id).await?;
        assert_eq!(second.archived_at, first.archived_at);

        Ok(())
    }
}
