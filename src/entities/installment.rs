//! Payment installment entity - One scheduled partial payment toward an order.
//!
//! Installment numbers are 1-based and unique per order, amounts are integers
//! in minor currency units, and the sum of non-cancelled amounts equals the
//! order's quoted value by construction of the installment plan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment installment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_installments")]
pub struct Model {
    /// Unique identifier for the installment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the order this installment belongs to
    pub order_id: i64,
    /// 1-based position within the order's installment plan
    pub installment_number: i32,
    /// Amount in minor currency units
    pub amount: i64,
    /// When this installment falls due
    pub due_date: DateTimeUtc,
    /// Current payment status
    pub status: InstallmentStatus,
    /// How the installment was paid, once known
    pub payment_method: Option<String>,
    /// Reference to an uploaded payment proof
    pub proof_url: Option<String>,
    /// When the payment was confirmed. Immutable once set.
    pub paid_at: Option<DateTimeUtc>,
    /// When the installment was created
    pub created_at: DateTimeUtc,
    /// When the installment was last modified
    pub updated_at: DateTimeUtc,
}

/// Payment status of a single installment.
///
/// `paid` and `cancelled` are terminal. The "overdue" badge shown to users is
/// a read-time classification over `pending` installments, not this stored
/// status, so a late installment does not need a write to show as late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Client reported the payment, awaiting admin confirmation
    #[sea_orm(string_value = "awaiting_confirmation")]
    AwaitingConfirmation,
    /// Payment confirmed
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Marked late by an explicit admin action
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Removed from the plan, no longer counted toward the total
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl InstallmentStatus {
    /// Whether this status is terminal - no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::AwaitingConfirmation => "Awaiting confirmation",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::AwaitingConfirmation => f.write_str("awaiting_confirmation"),
            Self::Paid => f.write_str("paid"),
            Self::Overdue => f.write_str("overdue"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Defines relationships between Installment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each installment belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
