//! Platform Session Abstraction
//!
//! Traits over the collaboration platform's remote object model: a session
//! provider that authenticates event records, and a remote session exposing
//! list/item lookup with a batched load/commit execution model.

pub mod memory;

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::receiver::events::EventRecord;
use crate::receiver::types::{Subscription, SubscriptionRequest};

/// A list on the remote site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteList {
    pub id: Uuid,
    pub name: String,
}

/// An item in a remote list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: i64,
    pub title: String,
}

/// Whether a session is scoped to the app lifecycle or to an item event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// App-level context (install/uninstall events).
    App,
    /// Item-level context, scoped to the triggering event.
    Item,
}

/// Errors raised by the platform session layer.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("platform fault: {0}")]
    Fault(String),
    #[error("session rejected: {0}")]
    Rejected(String),
}

/// Supplies ready-to-use remote sessions for event records.
///
/// `Ok(None)` means no session is available for this event; callers treat
/// that as "skip silently", not as an error.
pub trait SessionProvider: Clone + Send + Sync + 'static {
    type Session: RemoteSession;

    fn open(
        &self,
        record: &EventRecord,
        scope: SessionScope,
    ) -> impl Future<Output = Result<Option<Self::Session>, SessionError>> + Send;
}

/// A scoped session against the remote object model.
///
/// Reads fetch immediately; mutations are queued and only take effect on
/// [`commit`](Self::commit). A session is owned exclusively by one handler
/// invocation and released when dropped, on all paths.
pub trait RemoteSession: Send {
    fn find_list_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<RemoteList>, SessionError>> + Send;

    fn find_list_by_id(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<RemoteList>, SessionError>> + Send;

    fn load_subscriptions(
        &mut self,
        list: &RemoteList,
    ) -> impl Future<Output = Result<Vec<Subscription>, SessionError>> + Send;

    fn load_item(
        &mut self,
        list: &RemoteList,
        item_id: i64,
    ) -> impl Future<Output = Result<Option<ListItem>, SessionError>> + Send;

    /// Queue creation of a subscription on the list.
    fn queue_add_subscription(&mut self, list: &RemoteList, request: SubscriptionRequest);

    /// Queue deletion of the named subscription from the list.
    fn queue_delete_subscription(&mut self, list: &RemoteList, name: &str);

    /// Queue replacement of an item's title.
    fn queue_title_update(&mut self, list: &RemoteList, item_id: i64, title: String);

    /// Flush queued mutations to the platform.
    fn commit(&mut self) -> impl Future<Output = Result<(), SessionError>> + Send;
}
