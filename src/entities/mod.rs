//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod activity;
pub mod deliverable;
pub mod delivery;
pub mod installment;
pub mod order;
pub mod revision;

// Re-export specific types to avoid conflicts
pub use activity::{ActorType, Column as ActivityColumn, Entity as Activity, Model as ActivityModel};
pub use deliverable::{
    Column as DeliverableColumn, Entity as Deliverable, Model as DeliverableModel,
};
pub use delivery::{
    Column as DeliveryColumn, DeliveryStatus, Entity as Delivery, Model as DeliveryModel,
};
pub use installment::{
    Column as InstallmentColumn, Entity as Installment, InstallmentStatus,
    Model as InstallmentModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus, PaymentMode};
pub use revision::{
    Column as RevisionColumn, Entity as Revision, Model as RevisionModel, RequestedBy,
    RevisionStatus,
};
