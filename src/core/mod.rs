//! Core business logic - framework-agnostic order fulfillment operations.
//!
//! Each module owns one ledger of the fulfillment state machine. Operations
//! are async functions over a database connection with multi-entity writes in
//! explicit transactions; derivations are pure functions over fetched models
//! and a caller-supplied clock.

/// Activity log writes and reads
pub mod activity;
/// Deliverable files, expiry, and download bookkeeping
pub mod deliverables;
/// Token-addressed public delivery channel
pub mod delivery;
/// Status enum, stage projection, and lifecycle integrity checks
pub mod lifecycle;
/// Order lookups and archiving
pub mod orders;
/// Payment installments and ledger aggregation
pub mod payments;
/// Revision quota negotiation
pub mod revisions;
/// Merged activity feed read-model
pub mod timeline;
