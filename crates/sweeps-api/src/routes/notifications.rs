//! # Operator Notifications
//!
//! Read, dismiss and stream the [`Notifier`](crate::notify::Notifier) list.
//! The stream is Server-Sent Events: one `added` event per current
//! notification, then live events as they happen.

use std::convert::Infallible;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::error::AppError;
use crate::notify::{Notification, NotifierEvent};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/notifications", get(list_notifications))
        .route("/v1/admin/notifications/stream", get(stream_notifications))
        .route(
            "/v1/admin/notifications/{id}/dismiss",
            post(dismiss_notification),
        )
}

/// GET /v1/admin/notifications: Current notifications, oldest first.
#[utoipa::path(
    get,
    path = "/v1/admin/notifications",
    responses(
        (status = 200, description = "Current notifications", body = Vec<Notification>),
    ),
    tag = "notifications"
)]
pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifier.list())
}

/// POST /v1/admin/notifications/{id}/dismiss: Dismiss a notification.
///
/// Dismissing twice is not an error while the notification still exists.
#[utoipa::path(
    post,
    path = "/v1/admin/notifications/{id}/dismiss",
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification dismissed"),
        (status = 404, description = "Notification not found", body = crate::error::ErrorBody),
    ),
    tag = "notifications"
)]
pub async fn dismiss_notification(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if state.notifier.dismiss(id) || state.notifier.get(id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("notification {id}")))
    }
}

/// GET /v1/admin/notifications/stream: Server-Sent Events feed.
#[utoipa::path(
    get,
    path = "/v1/admin/notifications/stream",
    responses(
        (status = 200, description = "text/event-stream of notifier events"),
    ),
    tag = "notifications"
)]
pub async fn stream_notifications(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before snapshotting so nothing published in between is lost.
    let receiver = state.notifier.subscribe();
    let current = state
        .notifier
        .list()
        .into_iter()
        .map(|notification| NotifierEvent::Added { notification });

    let live = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let events = stream::iter(current)
        .chain(live)
        .map(|event| Ok(sse_event(&event)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn sse_event(event: &NotifierEvent) -> Event {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode notifier event");
            Event::default().event("error").data("encoding failed")
        }
    }
}
