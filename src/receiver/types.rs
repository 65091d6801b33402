//! Subscription Types & Receiver Errors
//!
//! Data structures for list subscriptions and the receiver error enum.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::SessionError;

/// Delivery mode for subscription callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// The platform blocks the triggering operation on the callback.
    Synchronous,
    /// The platform delivers the callback after the operation completes.
    Asynchronous,
}

/// A callback subscription registered on a list.
///
/// At most one subscription with a given name should exist per list; the
/// install handler checks before creating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub callback_url: String,
    pub delivery: DeliveryMode,
}

/// Request to create a subscription on a list.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    pub name: String,
    pub callback_url: String,
    pub delivery: DeliveryMode,
}

impl From<SubscriptionRequest> for Subscription {
    fn from(req: SubscriptionRequest) -> Self {
        Self {
            name: req.name,
            callback_url: req.callback_url,
            delivery: req.delivery,
        }
    }
}

/// Receiver errors.
#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("Platform session error: {0}")]
    Session(#[from] SessionError),
    #[error("List not found: {0}")]
    ListNotFound(String),
    #[error("Item {0} not found")]
    ItemNotFound(i64),
    #[error("Item event record carries no item properties")]
    MissingItemProperties,
    #[error("No callback URL could be derived for the subscription")]
    MissingCallbackUrl,
    #[error("One-way event delivery is not implemented")]
    NotImplemented,
}

impl From<ReceiverError> for (StatusCode, String) {
    fn from(err: ReceiverError) -> Self {
        match err {
            ReceiverError::NotImplemented => (StatusCode::NOT_IMPLEMENTED, err.to_string()),
            ReceiverError::Session(e) => {
                tracing::error!("Platform session error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ReceiverError::ListNotFound(_)
            | ReceiverError::ItemNotFound(_)
            | ReceiverError::MissingItemProperties
            | ReceiverError::MissingCallbackUrl => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}
