//! Payment ledger business logic.
//!
//! Tracks the installments of one order: building the plan from the payment
//! mode, aggregating paid/pending totals, and moving installments through
//! their status transitions. Confirmation is idempotent under retry because
//! client-facing UIs double-submit; the "overdue" badge is a read-time
//! classification over a caller-supplied clock, never written back.

use crate::{
    core::activity::log_activity,
    entities::{ActorType, Installment, Order, OrderStatus, PaymentMode, installment, order},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::{debug, info};

/// Days between consecutive installment due dates.
const DUE_DATE_INTERVAL_DAYS: i64 = 30;

/// Aggregated view of an order's payment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSummary {
    /// Sum of paid installment amounts, in minor units
    pub paid_total: i64,
    /// Sum of not-yet-paid, non-cancelled amounts, in minor units
    pub pending_total: i64,
    /// Sum of all non-cancelled amounts, in minor units
    pub total: i64,
    /// Rounded share of the total already paid, 0-100
    pub progress_percent: u8,
}

/// Aggregates an order's installments into totals and progress.
///
/// Cancelled installments are excluded entirely. An empty or fully cancelled
/// ledger reports zero progress rather than dividing by zero.
#[must_use]
pub fn aggregate(installments: &[installment::Model]) -> PaymentSummary {
    let mut paid_total = 0_i64;
    let mut total = 0_i64;

    for inst in installments {
        if inst.status == installment::InstallmentStatus::Cancelled {
            continue;
        }
        total += inst.amount;
        if inst.status == installment::InstallmentStatus::Paid {
            paid_total += inst.amount;
        }
    }

    let progress_percent = if total == 0 {
        0
    } else {
        // Round-half-up in integer math; amounts are minor units, no floats.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = ((paid_total * 100 + total / 2) / total) as u8;
        percent
    };

    PaymentSummary {
        paid_total,
        pending_total: total - paid_total,
        total,
        progress_percent,
    }
}

/// Read-time overdue classification.
///
/// True iff the installment is still `pending` and its due date has passed at
/// the caller-supplied clock. Stored state is never consulted beyond the
/// status, and never mutated.
#[must_use]
pub fn is_overdue(inst: &installment::Model, now: DateTimeUtc) -> bool {
    inst.status == installment::InstallmentStatus::Pending && inst.due_date < now
}

/// Whether the order's payment obligations are settled.
#[must_use]
pub fn is_payment_complete(order: &order::Model, installments: &[installment::Model]) -> bool {
    order.final_payment_at.is_some()
        || order.status == OrderStatus::Completed
        || aggregate(installments).progress_percent == 100
}

/// Splits a total into installment amounts for the given payment mode.
///
/// Amounts are integers in minor currency units and always sum exactly to the
/// total: uneven divisions push the remainder into the earliest installments.
///
/// # Arguments
/// * `total` - Quoted value in minor units
/// * `mode` - How the order is paid
/// * `installment_count` - Number of parts for [`PaymentMode::Installments`],
///   defaults to 2; ignored by the other modes
#[must_use]
pub fn split_amount(total: i64, mode: PaymentMode, installment_count: Option<usize>) -> Vec<i64> {
    match mode {
        PaymentMode::Full => vec![total],
        PaymentMode::Split5050 => vec![(total + 1) / 2, total / 2],
        PaymentMode::Split3070 => {
            let upfront = (total * 3 + 9) / 10;
            vec![upfront, total - upfront]
        }
        PaymentMode::Installments => {
            let count = installment_count.unwrap_or(2).max(1);
            let count_i64 = i64::try_from(count).unwrap_or(1);
            let base = total / count_i64;
            let remainder = total - base * count_i64;
            (0..count_i64)
                .map(|i| if i < remainder { base + 1 } else { base })
                .collect()
        }
    }
}

/// Due date for the installment at `index`, on a 30-day cadence from `base`.
///
/// The first installment falls due immediately; each subsequent one 30 days
/// after the previous.
#[must_use]
pub fn due_date_for(base: DateTimeUtc, index: usize) -> DateTimeUtc {
    let offset = i64::try_from(index).unwrap_or(0);
    base + Duration::days(DUE_DATE_INTERVAL_DAYS * offset)
}

/// Creates the installment plan for an order from its payment mode.
///
/// The plan covers the order's quoted value exactly, so the ledger invariant
/// (non-cancelled amounts sum to the quote) holds by construction. Refuses to
/// build a second plan on top of an existing one.
///
/// # Errors
/// Fails with [`Error::QuoteMissing`] when the order has no quoted value, and
/// with [`Error::Config`] when a non-cancelled plan already exists.
pub async fn create_installment_plan(
    db: &DatabaseConnection,
    order_id: i64,
    first_due: DateTimeUtc,
    installment_count: Option<usize>,
) -> Result<Vec<installment::Model>> {
    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            id: order_id.to_string(),
        })?;

    let quoted = order.quoted_value.ok_or(Error::QuoteMissing { order_id })?;

    let existing = Installment::find()
        .filter(installment::Column::OrderId.eq(order_id))
        .filter(installment::Column::Status.ne(installment::InstallmentStatus::Cancelled))
        .count(&txn)
        .await?;
    if existing > 0 {
        return Err(Error::Config {
            message: format!("Order {order_id} already has an installment plan"),
        });
    }

    let splits = split_amount(quoted, order.payment_mode, installment_count);
    let now = Utc::now();

    let mut created = Vec::with_capacity(splits.len());
    for (index, amount) in splits.iter().enumerate() {
        let model = installment::ActiveModel {
            order_id: Set(order_id),
            installment_number: Set(i32::try_from(index + 1)?),
            amount: Set(*amount),
            due_date: Set(due_date_for(first_due, index)),
            status: Set(installment::InstallmentStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(model.insert(&txn).await?);
    }

    log_activity(
        &txn,
        order_id,
        "installments_created",
        ActorType::Admin,
        None,
        json!({
            "payment_mode": order.payment_mode.label(),
            "count": splits.len(),
            "amounts": splits,
        }),
    )
    .await?;

    txn.commit().await?;
    info!(order_id, count = created.len(), "installment plan created");
    Ok(created)
}

/// Retrieves an order's installments in plan order.
pub async fn get_installments_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<installment::Model>> {
    Installment::find()
        .filter(installment::Column::OrderId.eq(order_id))
        .order_by_asc(installment::Column::InstallmentNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Confirms payment of an installment.
///
/// Allowed from `pending`, `overdue`, and `awaiting_confirmation`. Confirming
/// an installment that is already `paid` is a success and returns the record
/// unchanged, so UI retries and double-clicks are harmless; `paid_at` is set
/// exactly once and never moves.
///
/// When the confirmation settles the last unpaid installment of an order
/// still in `awaiting_payment`, the order rolls forward to
/// `payment_confirmed` with its payment milestone stamped.
///
/// # Errors
/// Fails with [`Error::InvalidTransition`] when the installment is
/// `cancelled`.
pub async fn confirm_installment(
    db: &DatabaseConnection,
    installment_id: i64,
    payment_method: Option<String>,
    proof_url: Option<String>,
) -> Result<installment::Model> {
    let txn = db.begin().await?;

    let inst = Installment::find_by_id(installment_id)
        .one(&txn)
        .await?
        .ok_or(Error::InstallmentNotFound { id: installment_id })?;

    match inst.status {
        installment::InstallmentStatus::Paid => {
            // Idempotent success: nothing to do, nothing changes.
            debug!(installment_id, "confirm on already-paid installment, no-op");
            return Ok(inst);
        }
        installment::InstallmentStatus::Cancelled => {
            return Err(Error::InvalidTransition {
                from: inst.status,
                to: installment::InstallmentStatus::Paid,
            });
        }
        installment::InstallmentStatus::Pending
        | installment::InstallmentStatus::Overdue
        | installment::InstallmentStatus::AwaitingConfirmation => {}
    }

    let order_id = inst.order_id;
    let installment_number = inst.installment_number;
    let now = Utc::now();

    let mut active: installment::ActiveModel = inst.into();
    active.status = Set(installment::InstallmentStatus::Paid);
    active.paid_at = Set(Some(now));
    if payment_method.is_some() {
        active.payment_method = Set(payment_method.clone());
    }
    if proof_url.is_some() {
        active.proof_url = Set(proof_url);
    }
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    log_activity(
        &txn,
        order_id,
        "installment_paid",
        ActorType::Admin,
        None,
        json!({
            "installment_number": installment_number,
            "payment_method": payment_method,
        }),
    )
    .await?;

    // Roll the order forward when nothing unpaid remains.
    let unpaid = Installment::find()
        .filter(installment::Column::OrderId.eq(order_id))
        .filter(installment::Column::Status.is_in([
            installment::InstallmentStatus::Pending,
            installment::InstallmentStatus::Overdue,
            installment::InstallmentStatus::AwaitingConfirmation,
        ]))
        .count(&txn)
        .await?;

    if unpaid == 0 {
        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::OrderNotFound {
                id: order_id.to_string(),
            })?;

        if order.status == OrderStatus::AwaitingPayment {
            let mut order_active: order::ActiveModel = order.into();
            order_active.status = Set(OrderStatus::PaymentConfirmed);
            order_active.payment_confirmed_at = Set(Some(now));
            order_active.updated_at = Set(now);
            order_active.update(&txn).await?;

            log_activity(&txn, order_id, "payment_confirmed", ActorType::System, None, json!({}))
                .await?;
            info!(order_id, "all installments paid, order rolled forward");
        }
    }

    txn.commit().await?;
    Ok(updated)
}

/// Client self-report of a payment: `pending`/`overdue` move to
/// `awaiting_confirmation` until an admin confirms.
///
/// Reporting an installment already `awaiting_confirmation` is an idempotent
/// no-op, for the same retry tolerance as confirmation.
///
/// # Errors
/// Fails with [`Error::InvalidTransition`] when the installment is already
/// `paid` or `cancelled`.
pub async fn self_report_payment(
    db: &DatabaseConnection,
    installment_id: i64,
    proof_url: Option<String>,
) -> Result<installment::Model> {
    let txn = db.begin().await?;

    let inst = Installment::find_by_id(installment_id)
        .one(&txn)
        .await?
        .ok_or(Error::InstallmentNotFound { id: installment_id })?;

    match inst.status {
        installment::InstallmentStatus::AwaitingConfirmation => {
            debug!(installment_id, "self-report already recorded, no-op");
            return Ok(inst);
        }
        installment::InstallmentStatus::Paid | installment::InstallmentStatus::Cancelled => {
            return Err(Error::InvalidTransition {
                from: inst.status,
                to: installment::InstallmentStatus::AwaitingConfirmation,
            });
        }
        installment::InstallmentStatus::Pending | installment::InstallmentStatus::Overdue => {}
    }

    let order_id = inst.order_id;
    let installment_number = inst.installment_number;
    let now = Utc::now();

    let mut active: installment::ActiveModel = inst.into();
    active.status = Set(installment::InstallmentStatus::AwaitingConfirmation);
    if proof_url.is_some() {
        active.proof_url = Set(proof_url);
    }
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    log_activity(
        &txn,
        order_id,
        "payment_self_reported",
        ActorType::Client,
        None,
        json!({ "installment_number": installment_number }),
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Attaches a payment proof to an installment that is not yet settled.
///
/// # Errors
/// Fails with [`Error::InstallmentSettled`] when the installment is `paid` or
/// `cancelled`.
pub async fn attach_proof(
    db: &DatabaseConnection,
    installment_id: i64,
    proof_url: String,
) -> Result<installment::Model> {
    let txn = db.begin().await?;

    let inst = Installment::find_by_id(installment_id)
        .one(&txn)
        .await?
        .ok_or(Error::InstallmentNotFound { id: installment_id })?;

    if inst.status.is_terminal() {
        return Err(Error::InstallmentSettled {
            id: installment_id,
            status: inst.status,
        });
    }

    let order_id = inst.order_id;
    let installment_number = inst.installment_number;

    let mut active: installment::ActiveModel = inst.into();
    active.proof_url = Set(Some(proof_url));
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    log_activity(
        &txn,
        order_id,
        "payment_proof_attached",
        ActorType::Client,
        None,
        json!({ "installment_number": installment_number }),
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Read-time integrity check over the payment ledger.
///
/// Once a plan exists, non-cancelled installment amounts must sum to the
/// order's quoted value. No ledger operation here changes amounts, so a
/// failure means the rows were altered outside the plan path.
///
/// # Errors
/// Fails with [`Error::LedgerMismatch`] when the sums disagree.
pub fn verify_installment_sum(
    order: &order::Model,
    installments: &[installment::Model],
) -> Result<()> {
    let Some(quoted) = order.quoted_value else {
        return Ok(());
    };
    if installments.is_empty() {
        return Ok(());
    }

    let sum: i64 = installments
        .iter()
        .filter(|i| i.status != installment::InstallmentStatus::Cancelled)
        .map(|i| i.amount)
        .sum();

    if sum != quoted {
        return Err(Error::LedgerMismatch {
            order_id: order.id,
            sum,
            quoted,
        });
    }

    Ok(())
}
