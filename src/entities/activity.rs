//! Activity log entity - Append-only record of everything that happened to an order.
//!
//! Entries are written inside the same transaction as the mutation they
//! describe, are never updated or deleted, and are read newest-first. The
//! `action` key is an open set: consumers must tolerate keys they do not know.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_activity_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the order this entry belongs to
    pub order_id: i64,
    /// Action key, e.g. `"installment_paid"` or `"revision_requested"`
    pub action: String,
    /// Which kind of actor performed the action
    pub actor_type: ActorType,
    /// Identifier of the acting user, when known
    pub actor_id: Option<String>,
    /// Free-form key/value context for the action
    pub details: Json,
    /// When the action happened
    pub created_at: DateTimeUtc,
}

/// Which kind of actor performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// A studio admin
    #[sea_orm(string_value = "admin")]
    Admin,
    /// The order's client
    #[sea_orm(string_value = "client")]
    Client,
    /// An automated process
    #[sea_orm(string_value = "system")]
    System,
}

impl ActorType {
    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Client => "Client",
            Self::System => "System",
        }
    }
}

impl From<super::revision::RequestedBy> for ActorType {
    fn from(value: super::revision::RequestedBy) -> Self {
        match value {
            super::revision::RequestedBy::Admin => Self::Admin,
            super::revision::RequestedBy::Client => Self::Client,
        }
    }
}

/// Defines relationships between Activity and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log entry belongs to one order
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
