//! Delivery entity - The token-addressed public delivery channel.
//!
//! A delivery bundles an order's handover behind a random access token that
//! can be shared without authentication. Access is withheld when the link has
//! expired or the delivery was revoked; the two conditions are independent
//! and revocation is permanent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    /// Unique identifier for the delivery
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the order this delivery belongs to
    pub order_id: i64,
    /// The order's protocol, denormalized for the public page
    pub protocol: String,
    /// Current delivery status
    pub status: DeliveryStatus,
    /// Random token the public access link is built from
    #[sea_orm(unique)]
    pub token: String,
    /// Message shown to the client on the delivery page
    pub message: Option<String>,
    /// External link handed over instead of, or along with, uploaded files
    pub external_link: Option<String>,
    /// How many days the link stays valid after sending
    pub validity_days: i32,
    /// When access lapses. Computed from `sent_at` plus `validity_days`.
    pub expires_at: Option<DateTimeUtc>,
    /// When the delivery was sent to the client
    pub sent_at: Option<DateTimeUtc>,
    /// How many times the public page was opened
    pub access_count: i32,
    /// How many downloads went through this delivery
    pub download_count: i32,
    /// When the public page was last opened
    pub last_access_at: Option<DateTimeUtc>,
    /// When the delivery was revoked. Permanent once set.
    pub revoked_at: Option<DateTimeUtc>,
    /// Who revoked the delivery
    pub revoked_by: Option<String>,
    /// When the delivery was created
    pub created_at: DateTimeUtc,
    /// When the delivery was last modified
    pub updated_at: DateTimeUtc,
}

/// Status of a token-addressed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Being assembled, token not yet handed out
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Assembled and ready to send
    #[sea_orm(string_value = "ready")]
    Ready,
    /// Sent to the client, link active until expiry or revocation
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Link lapsed by an explicit admin sweep
    #[sea_orm(string_value = "expired")]
    Expired,
    /// Access withdrawn by an admin, permanently
    #[sea_orm(string_value = "revoked")]
    Revoked,
}

impl DeliveryStatus {
    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Ready => "Ready to send",
            Self::Sent => "Sent",
            Self::Expired => "Expired",
            Self::Revoked => "Revoked",
        }
    }
}

/// Defines relationships between Delivery and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each delivery belongs to one order
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
