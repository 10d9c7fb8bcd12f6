//! AI explanations powered by the Claude API

pub mod client;
pub mod explanation;

pub use client::{ClaudeClient, CompletionBackend, CompletionError, SharedCompletion};
pub use explanation::{Explanation, ExplanationRequest};
