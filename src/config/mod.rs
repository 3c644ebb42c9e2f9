/// Database configuration and connection management
pub mod database;

/// Operational settings from order-desk.toml and the environment
pub mod settings;
