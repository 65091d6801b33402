//! In-Memory Platform
//!
//! In-process implementation of the session traits for local development
//! and tests. The real remote object model lives on the hosted platform;
//! this backend mirrors its batched load/commit behavior: queued mutations
//! are invisible until `commit`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use super::{ListItem, RemoteList, RemoteSession, SessionError, SessionProvider, SessionScope};
use crate::receiver::events::EventRecord;
use crate::receiver::types::{Subscription, SubscriptionRequest};

#[derive(Default)]
struct StoredList {
    name: String,
    subscriptions: Vec<Subscription>,
    /// Item titles keyed by item id.
    items: HashMap<i64, String>,
}

#[derive(Default)]
struct PlatformState {
    lists: HashMap<Uuid, StoredList>,
    deny_sessions: bool,
    fail_next_commit: bool,
}

/// Shared in-memory platform handle.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    inner: Arc<Mutex<PlatformState>>,
}

impl MemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list and return its id.
    pub fn create_list(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().lists.insert(
            id,
            StoredList {
                name: name.to_string(),
                ..StoredList::default()
            },
        );
        id
    }

    /// Insert an item into a list, replacing any item with the same id.
    pub fn insert_item(&self, list_id: Uuid, item_id: i64, title: &str) {
        if let Some(list) = self.lock().lists.get_mut(&list_id) {
            list.items.insert(item_id, title.to_string());
        }
    }

    /// Current title of an item, if the list and item exist.
    #[must_use]
    pub fn item_title(&self, list_id: Uuid, item_id: i64) -> Option<String> {
        self.lock()
            .lists
            .get(&list_id)
            .and_then(|list| list.items.get(&item_id).cloned())
    }

    /// Snapshot of the subscriptions registered on a list.
    #[must_use]
    pub fn subscriptions(&self, list_id: Uuid) -> Vec<Subscription> {
        self.lock()
            .lists
            .get(&list_id)
            .map(|list| list.subscriptions.clone())
            .unwrap_or_default()
    }

    /// Refuse all session opens from now on (`open` returns `Ok(None)`).
    pub fn deny_sessions(&self) {
        self.lock().deny_sessions = true;
    }

    /// Make the next `commit` fail with a platform fault.
    pub fn fail_next_commit(&self) {
        self.lock().fail_next_commit = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlatformState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionProvider for MemoryPlatform {
    type Session = MemorySession;

    async fn open(
        &self,
        _record: &EventRecord,
        _scope: SessionScope,
    ) -> Result<Option<Self::Session>, SessionError> {
        if self.lock().deny_sessions {
            return Ok(None);
        }
        Ok(Some(MemorySession {
            platform: Arc::clone(&self.inner),
            pending: Vec::new(),
        }))
    }
}

enum PendingOp {
    AddSubscription {
        list_id: Uuid,
        request: SubscriptionRequest,
    },
    DeleteSubscription {
        list_id: Uuid,
        name: String,
    },
    UpdateTitle {
        list_id: Uuid,
        item_id: i64,
        title: String,
    },
}

/// A session against the in-memory platform.
///
/// Buffers queued mutations and applies them atomically on `commit`.
pub struct MemorySession {
    platform: Arc<Mutex<PlatformState>>,
    pending: Vec<PendingOp>,
}

impl MemorySession {
    fn lock(&self) -> std::sync::MutexGuard<'_, PlatformState> {
        self.platform.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteSession for MemorySession {
    async fn find_list_by_name(&mut self, name: &str) -> Result<Option<RemoteList>, SessionError> {
        Ok(self.lock().lists.iter().find_map(|(id, list)| {
            (list.name == name).then(|| RemoteList {
                id: *id,
                name: list.name.clone(),
            })
        }))
    }

    async fn find_list_by_id(&mut self, id: Uuid) -> Result<Option<RemoteList>, SessionError> {
        Ok(self.lock().lists.get(&id).map(|list| RemoteList {
            id,
            name: list.name.clone(),
        }))
    }

    async fn load_subscriptions(
        &mut self,
        list: &RemoteList,
    ) -> Result<Vec<Subscription>, SessionError> {
        self.lock()
            .lists
            .get(&list.id)
            .map(|stored| stored.subscriptions.clone())
            .ok_or_else(|| SessionError::Fault(format!("list {} no longer exists", list.id)))
    }

    async fn load_item(
        &mut self,
        list: &RemoteList,
        item_id: i64,
    ) -> Result<Option<ListItem>, SessionError> {
        Ok(self.lock().lists.get(&list.id).and_then(|stored| {
            stored.items.get(&item_id).map(|title| ListItem {
                id: item_id,
                title: title.clone(),
            })
        }))
    }

    fn queue_add_subscription(&mut self, list: &RemoteList, request: SubscriptionRequest) {
        self.pending.push(PendingOp::AddSubscription {
            list_id: list.id,
            request,
        });
    }

    fn queue_delete_subscription(&mut self, list: &RemoteList, name: &str) {
        self.pending.push(PendingOp::DeleteSubscription {
            list_id: list.id,
            name: name.to_string(),
        });
    }

    fn queue_title_update(&mut self, list: &RemoteList, item_id: i64, title: String) {
        self.pending.push(PendingOp::UpdateTitle {
            list_id: list.id,
            item_id,
            title,
        });
    }

    async fn commit(&mut self) -> Result<(), SessionError> {
        let mut state = self.platform.lock().unwrap_or_else(PoisonError::into_inner);
        if state.fail_next_commit {
            state.fail_next_commit = false;
            return Err(SessionError::Fault("injected commit failure".into()));
        }
        for op in self.pending.drain(..) {
            match op {
                PendingOp::AddSubscription { list_id, request } => {
                    if let Some(list) = state.lists.get_mut(&list_id) {
                        list.subscriptions.push(request.into());
                    }
                }
                PendingOp::DeleteSubscription { list_id, name } => {
                    if let Some(list) = state.lists.get_mut(&list_id) {
                        list.subscriptions.retain(|sub| sub.name != name);
                    }
                }
                PendingOp::UpdateTitle {
                    list_id,
                    item_id,
                    title,
                } => {
                    if let Some(list) = state.lists.get_mut(&list_id) {
                        list.items.insert(item_id, title);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::events::EventKind;
    use crate::receiver::types::DeliveryMode;

    fn record() -> EventRecord {
        EventRecord {
            event_type: EventKind::AppInstalled,
            context_token: None,
            web_url: None,
            item_event_properties: None,
        }
    }

    #[tokio::test]
    async fn queued_mutations_invisible_before_commit() {
        let platform = MemoryPlatform::new();
        let list_id = platform.create_list("Announcements");

        let mut session = platform
            .open(&record(), SessionScope::App)
            .await
            .unwrap()
            .unwrap();
        let list = session
            .find_list_by_name("Announcements")
            .await
            .unwrap()
            .unwrap();
        session.queue_add_subscription(
            &list,
            SubscriptionRequest {
                name: "ItemAddedEvent".into(),
                callback_url: "https://rer.example/events/process".into(),
                delivery: DeliveryMode::Synchronous,
            },
        );

        assert!(platform.subscriptions(list_id).is_empty());
        session.commit().await.unwrap();
        assert_eq!(platform.subscriptions(list_id).len(), 1);
    }

    #[tokio::test]
    async fn fail_next_commit_fails_once() {
        let platform = MemoryPlatform::new();
        let list_id = platform.create_list("Announcements");
        platform.insert_item(list_id, 1, "Hello");
        platform.fail_next_commit();

        let mut session = platform
            .open(&record(), SessionScope::Item)
            .await
            .unwrap()
            .unwrap();
        let list = session.find_list_by_id(list_id).await.unwrap().unwrap();
        session.queue_title_update(&list, 1, "Hello again".into());
        assert!(session.commit().await.is_err());

        // The flag resets; the retried commit goes through
        session.queue_title_update(&list, 1, "Hello again".into());
        session.commit().await.unwrap();
        assert_eq!(
            platform.item_title(list_id, 1).as_deref(),
            Some("Hello again")
        );
    }

    #[tokio::test]
    async fn deny_sessions_yields_none() {
        let platform = MemoryPlatform::new();
        platform.deny_sessions();
        let session = platform.open(&record(), SessionScope::App).await.unwrap();
        assert!(session.is_none());
    }
}
