//! Platform Event Model
//!
//! Event records delivered by the collaboration platform and the trivial
//! result record returned to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event kinds the receiver reacts to.
///
/// Kinds the platform may send that are not listed here deserialize as
/// [`EventKind::Unknown`] and dispatch as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The app was installed or upgraded on a site.
    AppInstalled,
    /// The app is being uninstalled from a site.
    AppUninstalling,
    /// An item was added to a list.
    ItemAdded,
    /// Any event kind this receiver does not handle.
    #[serde(other)]
    Unknown,
}

impl EventKind {
    /// Parse from a string (e.g., `"app_installed"`).
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "app_installed" => Some(Self::AppInstalled),
            "app_uninstalling" => Some(Self::AppUninstalling),
            "item_added" => Some(Self::ItemAdded),
            _ => None,
        }
    }

    /// Convert to string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AppInstalled => "app_installed",
            Self::AppUninstalling => "app_uninstalling",
            Self::ItemAdded => "item_added",
            Self::Unknown => "unknown",
        }
    }

    /// How a handler failure for this kind is treated by the dispatcher.
    pub const fn failure_policy(&self) -> FailurePolicy {
        match self {
            // A missing subscription is a functional regression worth
            // failing loudly on.
            Self::AppInstalled => FailurePolicy::Propagate,
            // Uninstall and content handling must never block the
            // platform's own lifecycle or content operations.
            Self::AppUninstalling | Self::ItemAdded | Self::Unknown => {
                FailurePolicy::LogAndContinue
            }
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatcher-side classification of handler failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Surface the error to the hosting runtime as a fault.
    Propagate,
    /// Log the error and report success to the platform.
    LogAndContinue,
}

/// Identifiers carried by item-level events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemEventProperties {
    pub list_id: Uuid,
    pub list_item_id: i64,
}

/// An event record delivered by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: EventKind,
    /// Opaque site/session identity consumed by the session provider.
    #[serde(default)]
    pub context_token: Option<String>,
    /// URL of the site web the event originated from.
    #[serde(default)]
    pub web_url: Option<String>,
    /// Present for item-level events only.
    #[serde(default)]
    pub item_event_properties: Option<ItemEventProperties>,
}

/// Status reported back to the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Allow the platform operation to continue.
    #[default]
    Continue,
}

/// Result record returned to the platform.
///
/// Always reports success; handler side effects are not reflected here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EventResult {
    pub status: ResultStatus,
}
