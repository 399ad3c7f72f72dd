use std::ops::AddAssign;

use super::tool::ToolCall;

/// Text returned when a backend produced neither text nor tool calls
pub const FALLBACK_TEXT: &str = "The model returned an empty response. Please try again or rephrase your request.";

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of generation
    Stop,
    /// Hit the output token cap
    Length,
    /// The response carries tool calls
    ToolCalls,
    /// Content was filtered by a safety system
    ContentFilter,
}

impl StopReason {
    /// Derive the stop reason for a repaired response
    ///
    /// Tool calls win, then content filtering, then truncation.
    pub const fn derive(has_tool_calls: bool, signal: &FinishSignal) -> Self {
        if has_tool_calls {
            Self::ToolCalls
        } else if signal.content_filtered {
            Self::ContentFilter
        } else if signal.truncated {
            Self::Length
        } else {
            Self::Stop
        }
    }

    /// `OpenAI` `finish_reason` string
    pub const fn openai(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolCalls => "tool_calls",
            Self::ContentFilter => "content_filter",
        }
    }

    /// Anthropic `stop_reason` string
    pub const fn anthropic(self, stopped_on_sequence: bool) -> &'static str {
        match self {
            Self::ToolCalls => "tool_use",
            Self::Length => "max_tokens",
            Self::Stop if stopped_on_sequence => "stop_sequence",
            Self::Stop | Self::ContentFilter => "end_turn",
        }
    }
}

/// Backend stop signals gathered during extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishSignal {
    /// Output was cut at the token cap
    pub truncated: bool,
    /// A safety system filtered or blocked the output
    pub content_filtered: bool,
    /// The stop sequence that ended generation
    pub stop_sequence: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the completion
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
    /// Counts are a length-based estimate, not backend-reported
    pub estimated: bool,
}

impl Usage {
    /// Usage reported by the backend
    pub const fn reported(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
            estimated: false,
        }
    }

    /// Estimate from character counts, four characters per token
    pub fn estimate(prompt_chars: usize, completion_chars: usize) -> Self {
        let tokens = |chars: usize| u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX);

        Self {
            estimated: true,
            ..Self::reported(tokens(prompt_chars), tokens(completion_chars))
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(rhs.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(rhs.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
        self.estimated |= rhs.estimated;
    }
}

/// Normalized backend result, after extraction and tool-call repair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResult {
    /// Visible text, absent when no probe produced any
    pub text: Option<String>,
    /// Token usage, accumulated across orchestration turns
    pub usage: Usage,
    /// Repaired tool calls
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped
    pub stop_reason: StopReason,
    /// Stop sequence that ended generation, if any
    pub stop_sequence: Option<String>,
    /// No probe found text or tool calls in the backend response
    pub extraction_failed: bool,
}

impl NormalizedResult {
    /// Assemble a result, deriving the stop reason from the repaired calls
    pub fn new(text: Option<String>, usage: Usage, tool_calls: Vec<ToolCall>, signal: FinishSignal) -> Self {
        let stop_reason = StopReason::derive(!tool_calls.is_empty(), &signal);
        let extraction_failed = text.is_none() && tool_calls.is_empty();

        Self {
            text,
            usage,
            tool_calls,
            stop_reason,
            stop_sequence: signal.stop_sequence,
            extraction_failed,
        }
    }

    /// Text to show the client
    ///
    /// Never empty when there are no tool calls: a missing text becomes
    /// [`FALLBACK_TEXT`].
    pub fn visible_text(&self) -> Option<&str> {
        match (&self.text, self.tool_calls.is_empty()) {
            (Some(text), _) => Some(text),
            (None, true) => Some(FALLBACK_TEXT),
            (None, false) => None,
        }
    }
}
