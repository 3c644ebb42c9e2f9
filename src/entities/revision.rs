//! Order revision entity - A request to adjust delivered work.
//!
//! Revision numbers are 1-based and sequential per order, assigned from the
//! order's `revision_count` counter inside the same transaction that inserts
//! the row. `is_extra` is decided once, at creation time, by comparing the
//! pre-increment counter against the included quota.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order revision database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_revisions")]
pub struct Model {
    /// Unique identifier for the revision
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the order this revision belongs to
    pub order_id: i64,
    /// 1-based sequential number within the order
    pub revision_number: i32,
    /// What the client or admin wants changed
    pub description: String,
    /// Who asked for the revision
    pub requested_by: RequestedBy,
    /// Current negotiation status
    pub status: RevisionStatus,
    /// True iff the included quota was already used up when this was requested
    pub is_extra: bool,
    /// Billable surcharge for an extra revision, in minor currency units
    pub extra_cost: i64,
    /// The admin's reply to the request, if any
    pub admin_response: Option<String>,
    /// When the revision was requested
    pub created_at: DateTimeUtc,
    /// When the revision reached `completed` or `rejected`
    pub resolved_at: Option<DateTimeUtc>,
}

/// Negotiation status of a revision request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    /// Requested, not yet picked up
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being worked
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Done and accepted
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Declined by the admin
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl RevisionStatus {
    /// Whether this status closes the negotiation.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Completed => f.write_str("completed"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// Who initiated a revision request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum RequestedBy {
    /// Requested by the studio
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Requested by the client
    #[sea_orm(string_value = "client")]
    Client,
}

/// Defines relationships between Revision and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each revision belongs to one order
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
