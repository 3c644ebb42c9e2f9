//! Order deliverable entity - A file handed to the client.
//!
//! Deliverables carry optional time-bounded validity: once `expires_at` passes,
//! the metadata stays visible but the download link is withheld. The first
//! client download is recorded in `downloaded_at` and never overwritten.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order deliverable database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_deliverables")]
pub struct Model {
    /// Unique identifier for the deliverable
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the order this deliverable belongs to
    pub order_id: i64,
    /// File name shown to the client
    pub file_name: String,
    /// Storage location of the file
    pub file_url: String,
    /// MIME type or extension, if known
    pub file_type: Option<String>,
    /// File size in bytes, if known
    pub file_size: Option<i64>,
    /// Whether this is a final deliverable or a partial preview
    pub is_final: bool,
    /// When the file was delivered
    pub delivered_at: DateTimeUtc,
    /// When download access lapses. None means the link never expires.
    pub expires_at: Option<DateTimeUtc>,
    /// When the client first downloaded the file. Set once, never overwritten.
    pub downloaded_at: Option<DateTimeUtc>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Deliverable and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deliverable belongs to one order
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
