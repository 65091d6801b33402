//! Event Dispatch
//!
//! Routes event records to their handlers. Install failures propagate to
//! the hosting runtime; uninstall and item-update failures are logged and
//! swallowed so they never block the platform's own operations.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::events::{EventKind, EventRecord, EventResult, FailurePolicy};
use super::types::{DeliveryMode, ReceiverError, SubscriptionRequest};
use crate::config::Config;
use crate::platform::{RemoteSession, SessionProvider, SessionScope};

/// Marker prepended to the timestamp appended to item titles.
const TITLE_MARKER: &str = "Updated by RER";

/// Process an event record and produce the result returned to the platform.
///
/// The result is always `Continue`; side effects happen during dispatch.
/// Handler failures are resolved against the event kind's
/// [`FailurePolicy`]: install failures propagate, everything else is
/// logged and swallowed.
pub async fn process_event<P: SessionProvider>(
    provider: &P,
    config: &Config,
    callback_url: Option<&str>,
    record: &EventRecord,
) -> Result<EventResult, ReceiverError> {
    let outcome = match record.event_type {
        EventKind::AppInstalled => {
            handle_app_installed(provider, config, callback_url, record).await
        }
        EventKind::AppUninstalling => handle_app_uninstalling(provider, config, record).await,
        EventKind::ItemAdded => handle_item_added(provider, record).await,
        EventKind::Unknown => Ok(()),
    };

    if let Err(err) = outcome {
        match record.event_type.failure_policy() {
            FailurePolicy::Propagate => return Err(err),
            FailurePolicy::LogAndContinue => warn!(
                event = %record.event_type,
                error = %err,
                "Event handler failed; not propagated"
            ),
        }
    }

    Ok(EventResult::default())
}

/// Process a fire-and-forget event.
///
/// Required by the platform's endpoint contract but not used by this
/// receiver; always fails.
pub fn process_one_way_event(_record: &EventRecord) -> Result<(), ReceiverError> {
    Err(ReceiverError::NotImplemented)
}

/// Ensure the item-added subscription exists on the target list.
///
/// The existence check and the create are not transactional; two installs
/// racing on the same list can both pass the check and register twice.
async fn handle_app_installed<P: SessionProvider>(
    provider: &P,
    config: &Config,
    callback_url: Option<&str>,
    record: &EventRecord,
) -> Result<(), ReceiverError> {
    let Some(mut session) = provider.open(record, SessionScope::App).await? else {
        debug!("No app session available; skipping subscription registration");
        return Ok(());
    };

    let list = session
        .find_list_by_name(&config.target_list)
        .await?
        .ok_or_else(|| ReceiverError::ListNotFound(config.target_list.clone()))?;

    let subscriptions = session.load_subscriptions(&list).await?;
    if let Some(existing) = subscriptions
        .iter()
        .find(|sub| sub.name == config.receiver_name)
    {
        info!(
            receiver = %existing.name,
            url = %existing.callback_url,
            "Found existing item-added subscription"
        );
        return Ok(());
    }

    let callback = callback_url.ok_or(ReceiverError::MissingCallbackUrl)?;
    session.queue_add_subscription(
        &list,
        SubscriptionRequest {
            name: config.receiver_name.clone(),
            callback_url: callback.to_string(),
            delivery: DeliveryMode::Synchronous,
        },
    );
    session.commit().await?;

    info!(
        receiver = %config.receiver_name,
        url = %callback,
        "Registered item-added subscription"
    );
    Ok(())
}

/// Remove the item-added subscription from the target list.
///
/// Absence is tolerated; the dispatcher swallows any error raised here.
async fn handle_app_uninstalling<P: SessionProvider>(
    provider: &P,
    config: &Config,
    record: &EventRecord,
) -> Result<(), ReceiverError> {
    let Some(mut session) = provider.open(record, SessionScope::App).await? else {
        debug!("No app session available; skipping subscription removal");
        return Ok(());
    };

    let list = session
        .find_list_by_name(&config.target_list)
        .await?
        .ok_or_else(|| ReceiverError::ListNotFound(config.target_list.clone()))?;

    let subscriptions = session.load_subscriptions(&list).await?;
    match subscriptions
        .iter()
        .find(|sub| sub.name == config.receiver_name)
    {
        Some(subscription) => {
            info!(url = %subscription.callback_url, "Removing item-added subscription");
            session.queue_delete_subscription(&list, &subscription.name);
            session.commit().await?;
        }
        None => {
            debug!(receiver = %config.receiver_name, "No subscription to remove");
        }
    }
    Ok(())
}

/// Append a timestamped annotation to the title of the added item.
///
/// Appends on every trigger; repeated events for the same item grow the
/// title, preserving the audit trail.
async fn handle_item_added<P: SessionProvider>(
    provider: &P,
    record: &EventRecord,
) -> Result<(), ReceiverError> {
    let properties = record
        .item_event_properties
        .as_ref()
        .ok_or(ReceiverError::MissingItemProperties)?;

    let Some(mut session) = provider.open(record, SessionScope::Item).await? else {
        debug!("No item session available; skipping item annotation");
        return Ok(());
    };

    let list = session
        .find_list_by_id(properties.list_id)
        .await?
        .ok_or_else(|| ReceiverError::ListNotFound(properties.list_id.to_string()))?;
    let item = session
        .load_item(&list, properties.list_item_id)
        .await?
        .ok_or(ReceiverError::ItemNotFound(properties.list_item_id))?;

    session.queue_title_update(&list, item.id, annotated_title(&item.title, Local::now()));
    session.commit().await?;

    debug!(
        list = %list.id,
        item = item.id,
        "Annotated item title"
    );
    Ok(())
}

/// Append the marker and a local `HH:MM:SS` timestamp to a title.
fn annotated_title(title: &str, now: DateTime<Local>) -> String {
    format!("{title}\n{TITLE_MARKER} {}", now.format("%H:%M:%S"))
}
