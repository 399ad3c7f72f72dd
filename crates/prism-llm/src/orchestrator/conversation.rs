use std::collections::{HashSet, VecDeque};

use crate::types::{Message, Role};

/// Bounded transcript owned by one request
///
/// Holds at most `max_history` messages. The oldest messages are evicted
/// first, except the latest user message, which stays so the model never
/// loses the question it is answering. Evicting an assistant message also
/// evicts the tool results answering its calls, including ones pushed later.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: VecDeque<Message>,
    max_history: usize,
    evicted: usize,
    /// Ids of tool calls whose assistant message was evicted
    evicted_calls: HashSet<String>,
}

impl ConversationState {
    pub fn new(max_history: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_history: max_history.max(1),
            evicted: 0,
            evicted_calls: HashSet::new(),
        }
    }

    pub fn from_messages(messages: impl IntoIterator<Item = Message>, max_history: usize) -> Self {
        let mut state = Self::new(max_history);
        for message in messages {
            state.push(message);
        }
        state
    }

    pub fn push(&mut self, message: Message) {
        if message.role == Role::Tool
            && message
                .tool_call_id
                .as_ref()
                .is_some_and(|id| self.evicted_calls.contains(id))
        {
            self.evicted += 1;
            return;
        }

        self.messages.push_back(message);

        while self.messages.len() > self.max_history {
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        let pinned = self.messages.iter().rposition(|m| m.role == Role::User);
        let index = usize::from(pinned == Some(0));

        let Some(message) = self.messages.remove(index) else {
            return;
        };
        self.evicted += 1;

        if message.role != Role::Assistant || message.tool_calls.is_empty() {
            return;
        }

        // Results without an id can only be matched by position
        while self.messages.get(index).is_some_and(|m| m.role == Role::Tool) && self.messages.remove(index).is_some() {
            self.evicted += 1;
        }

        self.evicted_calls.extend(message.tool_calls.into_iter().map(|call| call.id));

        let before = self.messages.len();
        let evicted_calls = &self.evicted_calls;
        self.messages.retain(|m| {
            m.role != Role::Tool || !m.tool_call_id.as_ref().is_some_and(|id| evicted_calls.contains(id))
        });
        self.evicted += before - self.messages.len();
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages dropped so far to respect the bound
    pub const fn evicted(&self) -> usize {
        self.evicted
    }
}
