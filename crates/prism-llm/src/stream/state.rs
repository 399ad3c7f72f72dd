use crate::types::StreamEvent;

/// Position of a stream in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Nothing sent yet
    #[default]
    Idle,
    /// Message opened
    RoleSent,
    /// At least one block opened
    Content,
    /// Stop reason sent
    Finished,
    /// Stream terminated
    Closed,
}

/// Guards the canonical event order
///
/// Every event a generator produces passes through here; anything that
/// would break the sequence is rejected.
#[derive(Debug, Default)]
pub struct Sequencer {
    state: StreamState,
}

impl Sequencer {
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Advance on `event`, returning false when it is out of order
    pub fn accept(&mut self, event: &StreamEvent) -> bool {
        use StreamState::{Closed, Content, Finished, Idle, RoleSent};

        let next = match (self.state, event) {
            (Closed, _) => None,
            (_, StreamEvent::Heartbeat) => Some(self.state),
            (_, StreamEvent::Error(_)) => Some(Closed),
            (Idle, StreamEvent::MessageStart { .. }) => Some(RoleSent),
            (RoleSent | Content, StreamEvent::BlockStart { .. }) => Some(Content),
            (Content, StreamEvent::BlockDelta { .. } | StreamEvent::BlockStop { .. }) => Some(Content),
            (RoleSent | Content, StreamEvent::MessageDelta { .. }) | (Finished, StreamEvent::MessageStop) => {
                Some(Finished)
            }
            (Finished, StreamEvent::DoneMarker) => Some(Closed),
            _ => None,
        };

        match next {
            Some(state) => {
                self.state = state;
                true
            }
            None => {
                tracing::warn!(state = ?self.state, event = ?event, "dropping out-of-order stream event");
                false
            }
        }
    }
}
