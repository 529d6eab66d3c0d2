//! Server-sent event stream of the signed-in user's changes.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::CACHE_CONTROL;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use futures::StreamExt;

use dashx_entity::event::Event;
use dashx_realtime::stream::subscription_stream;

use crate::cookies::channel_cookie;
use crate::extractors::CurrentUser;
use crate::state::AppState;

fn frame(event: &Event) -> Result<SseEvent, Infallible> {
    let frame = SseEvent::default().event(event.action().as_str());
    Ok(match frame.json_data(event) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode event");
            SseEvent::default().comment("unencodable event")
        }
    })
}

/// GET /api/v1/events
///
/// Opens a channel for the caller and names it in the `ecid` cookie. The
/// stream ends after a logout signal; a client disconnect drops it.
pub async fn stream_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> impl IntoResponse {
    let subscription = state.events.subscribe(user.id);
    let cookie = channel_cookie(&state.config.server, &subscription.channel_id().to_string());

    tracing::info!(user_id = %user.id, channel_id = %subscription.channel_id(), "Event stream opened");

    let keep_alive =
        KeepAlive::new().interval(Duration::from_secs(state.config.realtime.keep_alive_seconds));
    let frames = subscription_stream(subscription).map(|event| frame(&event));

    (
        jar.add(cookie),
        [(CACHE_CONTROL, HeaderValue::from_static("no-cache"))],
        Sse::new(frames).keep_alive(keep_alive),
    )
}
