//! Remote Event Receiver
//!
//! Dispatches platform events (app installed, app uninstalling, item added)
//! to handlers that manage the item-added subscription and annotate items.

pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod types;
