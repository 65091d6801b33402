//! Remote Event Receiver Server
//!
//! Receives lifecycle and content events from a hosted collaboration
//! platform and maintains an item-added subscription on a target list.

pub mod api;
pub mod config;
pub mod platform;
pub mod receiver;
