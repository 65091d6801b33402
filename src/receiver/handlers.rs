//! Receiver HTTP Handlers
//!
//! The platform-facing endpoint: request/response event processing and the
//! fire-and-forget placeholder.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::Json;
use tracing::instrument;

use super::dispatch;
use super::events::{EventRecord, EventResult};
use crate::api::AppState;
use crate::platform::SessionProvider;

/// POST /`events/process`
///
/// Dispatches the event record. The derived request URL becomes the
/// callback address for subscriptions created by install handling.
#[instrument(skip_all, fields(event = %record.event_type))]
pub async fn process_event<P: SessionProvider>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
    uri: Uri,
    Json(record): Json<EventRecord>,
) -> Result<Json<EventResult>, (StatusCode, String)> {
    let callback = request_url(state.config.public_url.as_deref(), &headers, &uri);
    let result =
        dispatch::process_event(&state.provider, &state.config, callback.as_deref(), &record)
            .await?;
    Ok(Json(result))
}

/// POST /`events/process-oneway`
///
/// Required placeholder; not used by this receiver.
#[instrument(skip_all)]
pub async fn process_one_way_event(Json(record): Json<EventRecord>) -> (StatusCode, String) {
    match dispatch::process_one_way_event(&record) {
        Ok(()) => (StatusCode::OK, String::new()),
        Err(err) => err.into(),
    }
}

/// Reconstruct the URL this request was addressed to.
///
/// Prefers the configured public base URL, then proxy forwarding headers,
/// then the plain `Host` header.
fn request_url(public_url: Option<&str>, headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(base) = public_url {
        return Some(format!("{}{}", base.trim_end_matches('/'), uri.path()));
    }

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))?
        .to_str()
        .ok()?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Some(format!("{proto}://{host}{}", uri.path()))
}
