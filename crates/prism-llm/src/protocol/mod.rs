//! Wire format types for the client-facing API protocols
//!
//! Each module contains pure serde structs matching the respective public
//! API's JSON format. These types are only used at the HTTP boundary and
//! never inside the engine.

pub mod anthropic;
pub mod openai;

/// Client-facing protocol of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// `POST /v1/chat/completions`
    OpenAiChat,
    /// `POST /v1/completions`
    OpenAiCompletion,
    /// `POST /v1/messages`
    Anthropic,
}

impl Protocol {
    /// Label used in logs and metrics
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAiChat => "openai_chat",
            Self::OpenAiCompletion => "openai_completion",
            Self::Anthropic => "anthropic",
        }
    }

    /// Prefix of response ids issued for this protocol
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::OpenAiChat => "chatcmpl-",
            Self::OpenAiCompletion => "cmpl-",
            Self::Anthropic => "msg_",
        }
    }
}
