use std::sync::Arc;

use tiktoken_rs::{CoreBPE, o200k_base};

use crate::orchestrator::{ConversationState, prompt};
use crate::types::ChatRequest;

/// Prompt token counting for `count_tokens`
///
/// Uses the `o200k_base` encoding. If the encoding cannot be loaded the
/// count falls back to one token per four bytes.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Option<Arc<CoreBPE>>,
}

impl TokenCounter {
    pub fn new() -> Self {
        let bpe = match o200k_base() {
            Ok(bpe) => Some(Arc::new(bpe)),
            Err(e) => {
                tracing::warn!(error = %e, "tokenizer unavailable, counting by length");
                None
            }
        };

        Self { bpe }
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.as_ref().map_or_else(
            || text.len().div_ceil(4),
            |bpe| bpe.encode_with_special_tokens(text).len(),
        )
    }

    /// Tokens the backend would see as input for `request`
    pub fn count_request(&self, request: &ChatRequest) -> usize {
        let conversation = ConversationState::from_messages(request.messages.iter().cloned(), usize::MAX);
        let system = request.system.as_deref().map_or(0, |s| self.count(s));

        system + self.count(&prompt::render(&request.tools, &conversation))
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("tokenizer", &self.bpe.as_ref().map(|_| "o200k_base"))
            .finish()
    }
}
