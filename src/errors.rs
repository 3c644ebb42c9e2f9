//! Unified error types and result handling for the order fulfillment core.
//!
//! Every fallible operation in the crate returns [`Result`], and the error
//! taxonomy mirrors the failure semantics of the domain: unknown status
//! strings, disallowed status transitions, concurrent counter races, and
//! read-time ledger drift all get their own variant so callers can react
//! to each case individually.

use crate::entities::{installment::InstallmentStatus, revision::RevisionStatus};
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A stage projection was requested for a status string that is not one
    /// of the thirteen recognized order statuses. Never silently defaulted.
    #[error("Unknown order status: {value:?}")]
    UnknownStatus {
        /// The unrecognized raw status value
        value: String,
    },

    /// No order exists with the given identifier or protocol.
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Identifier or protocol used in the lookup
        id: String,
    },

    /// No installment exists with the given identifier.
    #[error("Installment not found: {id}")]
    InstallmentNotFound {
        /// Installment primary key
        id: i64,
    },

    /// No revision exists with the given identifier.
    #[error("Revision not found: {id}")]
    RevisionNotFound {
        /// Revision primary key
        id: i64,
    },

    /// No deliverable exists with the given identifier.
    #[error("Deliverable not found: {id}")]
    DeliverableNotFound {
        /// Deliverable primary key
        id: i64,
    },

    /// No delivery exists with the given identifier or token.
    #[error("Delivery not found: {id}")]
    DeliveryNotFound {
        /// Delivery primary key or access token used in the lookup
        id: String,
    },

    /// An installment status change outside the allowed transition table.
    #[error("Invalid installment transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the installment currently holds
        from: InstallmentStatus,
        /// Status the caller attempted to move to
        to: InstallmentStatus,
    },

    /// A revision status change outside the allowed transition table.
    #[error("Invalid revision transition: {from} -> {to}")]
    InvalidRevisionTransition {
        /// Status the revision currently holds
        from: RevisionStatus,
        /// Status the caller attempted to move to
        to: RevisionStatus,
    },

    /// A proof attachment was attempted on a settled installment.
    #[error("Installment {id} is settled ({status}), proof can no longer be attached")]
    InstallmentSettled {
        /// Installment primary key
        id: i64,
        /// The terminal status the installment holds
        status: InstallmentStatus,
    },

    /// The revision counter moved between read and write; the caller should
    /// retry the whole operation.
    #[error("Order {order_id} was modified concurrently, retry the operation")]
    ConcurrentModification {
        /// Order whose counter raced
        order_id: i64,
    },

    /// Read-time integrity check failed: a stored revision carries a number
    /// higher than the order's counter.
    #[error(
        "Revision counter drift on order {order_id}: counter is {counter} but highest stored revision is {highest}"
    )]
    CounterDrift {
        /// Order whose ledger is inconsistent
        order_id: i64,
        /// Counter value stored on the order
        counter: i32,
        /// Highest revision number found among the stored rows
        highest: i32,
    },

    /// Read-time integrity check failed: non-cancelled installments no longer
    /// sum to the order's quoted value.
    #[error("Installment sum {sum} does not match quoted value {quoted} on order {order_id}")]
    LedgerMismatch {
        /// Order whose ledger is inconsistent
        order_id: i64,
        /// Sum of non-cancelled installment amounts, in minor units
        sum: i64,
        /// Quoted value stored on the order, in minor units
        quoted: i64,
    },

    /// An installment plan was requested for an order without a quoted value.
    #[error("Order {order_id} has no quoted value, cannot build an installment plan")]
    QuoteMissing {
        /// Order missing its quote
        order_id: i64,
    },

    /// A send was attempted on a revoked delivery. Revocation is permanent.
    #[error("Delivery {id} has been revoked")]
    DeliveryRevoked {
        /// Delivery primary key
        id: i64,
    },

    /// Database error from the persistence layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error, typically while reading a settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Numeric conversion error.
    #[error("Numeric conversion error: {0}")]
    TryFromInt(#[from] std::num::TryFromIntError),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
