//! Order entity - The unit of work tracked end-to-end from briefing to delivery.
//!
//! Each order carries an immutable human-facing protocol, a lifecycle status,
//! payment configuration, the revision quota bookkeeping, and the milestone
//! timestamps the stage projection derives its evidence from. Orders are never
//! deleted; they are archived via the `archived_at` marker.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable immutable order identifier, distinct from the internal id
    #[sea_orm(unique)]
    pub protocol: String,
    /// Client this order belongs to, if the client has an account
    pub client_id: Option<String>,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// How the quoted value is split into installments
    pub payment_mode: PaymentMode,
    /// Quoted value in minor currency units, None until a quote is sent
    pub quoted_value: Option<i64>,
    /// Number of revisions included in the quoted value
    pub max_revisions: i32,
    /// Monotonically non-decreasing count of revisions requested so far
    pub revision_count: i32,
    /// Briefing completeness score, 0-100
    pub briefing_completeness_score: i32,
    /// When the briefing was submitted
    pub briefing_at: DateTimeUtc,
    /// When the quote was sent to the client
    pub quote_sent_at: Option<DateTimeUtc>,
    /// When the client approved the quote
    pub approved_at: Option<DateTimeUtc>,
    /// When the initial payment was confirmed
    pub payment_confirmed_at: Option<DateTimeUtc>,
    /// Agreed production deadline
    pub final_deadline: Option<DateTimeUtc>,
    /// When the work was delivered
    pub delivered_at: Option<DateTimeUtc>,
    /// When the final payment was confirmed
    pub final_payment_at: Option<DateTimeUtc>,
    /// Token for the public tracking page, if one was issued
    pub public_token: Option<String>,
    /// Archive marker - archived orders are hidden but never deleted
    pub archived_at: Option<DateTimeUtc>,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Lifecycle status of an order.
///
/// The ten happy-path statuses form a total order from `briefing` to
/// `completed`; `cancelled` and `rejected` are terminal absorbing states
/// reachable from most non-terminal statuses by an admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Briefing received, quote not yet prepared
    #[sea_orm(string_value = "briefing")]
    Briefing,
    /// Quote sent, awaiting the client's decision
    #[sea_orm(string_value = "quote_sent")]
    QuoteSent,
    /// Quote approved by the client
    #[sea_orm(string_value = "quote_approved")]
    QuoteApproved,
    /// Waiting for the initial payment
    #[sea_orm(string_value = "awaiting_payment")]
    AwaitingPayment,
    /// Initial payment confirmed
    #[sea_orm(string_value = "payment_confirmed")]
    PaymentConfirmed,
    /// Work in production
    #[sea_orm(string_value = "in_production")]
    InProduction,
    /// Work presented, awaiting the client's approval
    #[sea_orm(string_value = "awaiting_client_approval")]
    AwaitingClientApproval,
    /// A revision is being worked
    #[sea_orm(string_value = "in_revision")]
    InRevision,
    /// Waiting for the final payment before handing over files
    #[sea_orm(string_value = "awaiting_final_payment")]
    AwaitingFinalPayment,
    /// Order fulfilled
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Terminal: cancelled by the admin or the client
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Terminal: quote rejected
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl OrderStatus {
    /// The stored string value of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Briefing => "briefing",
            Self::QuoteSent => "quote_sent",
            Self::QuoteApproved => "quote_approved",
            Self::AwaitingPayment => "awaiting_payment",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::InProduction => "in_production",
            Self::AwaitingClientApproval => "awaiting_client_approval",
            Self::InRevision => "in_revision",
            Self::AwaitingFinalPayment => "awaiting_final_payment",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Briefing => "Briefing received",
            Self::QuoteSent => "Quote sent",
            Self::QuoteApproved => "Quote approved",
            Self::AwaitingPayment => "Awaiting payment",
            Self::PaymentConfirmed => "Payment confirmed",
            Self::InProduction => "In production",
            Self::AwaitingClientApproval => "Awaiting client approval",
            Self::InRevision => "In revision",
            Self::AwaitingFinalPayment => "Awaiting final payment",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether this status is a terminal absorbing state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Rejected | Self::Completed)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "briefing" => Ok(Self::Briefing),
            "quote_sent" => Ok(Self::QuoteSent),
            "quote_approved" => Ok(Self::QuoteApproved),
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "payment_confirmed" => Ok(Self::PaymentConfirmed),
            "in_production" => Ok(Self::InProduction),
            "awaiting_client_approval" => Ok(Self::AwaitingClientApproval),
            "in_revision" => Ok(Self::InRevision),
            "awaiting_final_payment" => Ok(Self::AwaitingFinalPayment),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an order's quoted value is split into installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Single payment of the full quoted value
    #[sea_orm(string_value = "full")]
    Full,
    /// Half upfront, half on completion
    #[sea_orm(string_value = "split_50_50")]
    Split5050,
    /// Thirty percent upfront, seventy on completion
    #[sea_orm(string_value = "split_30_70")]
    Split3070,
    /// N near-equal monthly installments
    #[sea_orm(string_value = "installments")]
    Installments,
}

impl PaymentMode {
    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "Full payment",
            Self::Split5050 => "50% + 50%",
            Self::Split3070 => "30% + 70%",
            Self::Installments => "Installments",
        }
    }
}

/// Defines relationships between Order and its child entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many payment installments
    #[sea_orm(has_many = "super::installment::Entity")]
    Installments,
    /// One order has many revisions
    #[sea_orm(has_many = "super::revision::Entity")]
    Revisions,
    /// One order has many deliverables
    #[sea_orm(has_many = "super::deliverable::Entity")]
    Deliverables,
    /// One order has many token-addressed deliveries
    #[sea_orm(has_many = "super::delivery::Entity")]
    Deliveries,
    /// One order has many activity log entries
    #[sea_orm(has_many = "super::activity::Entity")]
    Activities,
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl Related<super::revision::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revisions.def()
    }
}

impl Related<super::deliverable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deliverables.def()
    }
}

impl Related<super::delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deliveries.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
