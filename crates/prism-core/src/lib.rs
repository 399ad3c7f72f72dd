//! Shared building blocks for the Prism gateway crates

#![allow(clippy::must_use_candidate)]

mod context;
mod error;
pub mod headers;

pub use context::RequestContext;
pub use error::{ErrorBody, ErrorEnvelope, HttpError};
