//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::Result;
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Name registered for the item-added subscription (default: "ItemAddedEvent")
    pub receiver_name: String,

    /// Title of the list the install handler registers against (default: "Announcements")
    pub target_list: String,

    /// Public base URL of this service (optional)
    ///
    /// When set, callback URLs for new subscriptions are derived from it
    /// instead of the inbound request's host headers.
    pub public_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            receiver_name: env::var("RECEIVER_NAME").unwrap_or_else(|_| "ItemAddedEvent".into()),
            target_list: env::var("TARGET_LIST").unwrap_or_else(|_| "Announcements".into()),
            public_url: env::var("PUBLIC_URL").ok(),
        })
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            receiver_name: "ItemAddedEvent".into(),
            target_list: "Announcements".into(),
            public_url: None,
        }
    }
}
