//! Operational settings loaded from a TOML file and the environment.
//!
//! Settings cover the knobs the back office tunes per deployment: the
//! included revision quota, validity windows for deliverable links and
//! token deliveries, and the base URL public links are built from. The
//! settings file is optional; every field has a default.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Revisions included in a quote unless the admin sets a different quota.
pub const DEFAULT_MAX_REVISIONS: i32 = 2;

/// Days a deliverable download link stays valid by default.
pub const DEFAULT_DELIVERABLE_VALIDITY_DAYS: i64 = 30;

/// Days a token delivery link stays valid by default.
pub const DEFAULT_DELIVERY_VALIDITY_DAYS: i32 = 7;

/// Operational settings for the order desk.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Revisions included in a quote
    #[serde(default = "default_max_revisions")]
    pub included_revisions: i32,
    /// Default validity window for deliverable links, in days
    #[serde(default = "default_deliverable_validity_days")]
    pub deliverable_validity_days: i64,
    /// Default validity window for token deliveries, in days
    #[serde(default = "default_delivery_validity_days")]
    pub delivery_validity_days: i32,
    /// Base URL public tracking and delivery links are built from
    #[serde(default = "default_tracking_base_url")]
    pub tracking_base_url: String,
}

const fn default_max_revisions() -> i32 {
    DEFAULT_MAX_REVISIONS
}

const fn default_deliverable_validity_days() -> i64 {
    DEFAULT_DELIVERABLE_VALIDITY_DAYS
}

const fn default_delivery_validity_days() -> i32 {
    DEFAULT_DELIVERY_VALIDITY_DAYS
}

fn default_tracking_base_url() -> String {
    "http://localhost:5173".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            included_revisions: default_max_revisions(),
            deliverable_validity_days: default_deliverable_validity_days(),
            delivery_validity_days: default_delivery_validity_days(),
            tracking_base_url: default_tracking_base_url(),
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from the default location (`./order-desk.toml`), applying
/// environment overrides.
///
/// A missing file is not an error; defaults apply. `.env` is consulted first
/// so local overrides work without exporting variables, and
/// `TRACKING_BASE_URL` beats the file either way.
pub fn load_default_settings() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let mut settings = if Path::new("order-desk.toml").exists() {
        load_settings("order-desk.toml")?
    } else {
        Settings::default()
    };

    if let Ok(base_url) = std::env::var("TRACKING_BASE_URL") {
        settings.tracking_base_url = base_url;
    }

    Ok(settings)
}
