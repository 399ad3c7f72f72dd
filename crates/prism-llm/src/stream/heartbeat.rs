use std::time::Duration;

use futures_util::{StreamExt, stream};

use super::EventStream;
use crate::types::StreamEvent;

/// Interleave [`StreamEvent::Heartbeat`] whenever `inner` is idle for `interval`
///
/// The inner stream is polled again after every heartbeat, so a slow
/// future inside it keeps running. Heartbeats stop once the inner stream
/// ends.
pub fn with_heartbeats(inner: EventStream, interval: Duration) -> EventStream {
    stream::unfold(inner, move |mut inner| async move {
        match tokio::time::timeout(interval, inner.next()).await {
            Ok(Some(event)) => Some((event, inner)),
            Ok(None) => None,
            Err(_) => Some((StreamEvent::Heartbeat, inner)),
        }
    })
    .boxed()
}
