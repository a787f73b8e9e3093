//! Lightweight LLM integration helpers.
//!
//! Typed wrappers for the chat-completions wire format, tool declarations, and
//! the OpenAI-compatible client that plays the reasoning service.

/// Assistant reply type.
pub mod ai;
pub(crate) mod chat_runtime;
/// OpenAI-compatible chat-completions client.
pub mod openai;
/// Provider-agnostic chat interfaces.
pub mod provider;
/// Tool schema and invocation payload helpers.
pub mod tools;
