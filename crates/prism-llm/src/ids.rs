use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Response id, unique within the process
    pub id: String,
    /// Unix timestamp, never smaller than any previously issued one
    pub created: u64,
    /// Model id echoed to the client
    pub model: String,
}

/// Issues response ids and creation timestamps
///
/// The only clock-dependent input to response formatting. Owned by the
/// engine state and shared by every request.
#[derive(Debug, Default)]
pub struct ResponseIds {
    last_created: AtomicU64,
}

impl ResponseIds {
    pub const fn new() -> Self {
        Self {
            last_created: AtomicU64::new(0),
        }
    }

    /// Identity for a new response, with `prefix` such as `chatcmpl-` or `msg_`
    pub fn next(&self, prefix: &str, model: &str) -> ResponseMeta {
        let now = u64::try_from(jiff::Timestamp::now().as_second()).unwrap_or(0);
        let previous = self.last_created.fetch_max(now, Ordering::Relaxed);

        ResponseMeta {
            id: format!("{prefix}{}", uuid::Uuid::new_v4().simple()),
            created: previous.max(now),
            model: model.to_owned(),
        }
    }
}
