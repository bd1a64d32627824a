//! Model execution engine client for MeetBrief.
//!
//! Wraps an OpenAI-compatible chat-completions API (OpenRouter) behind
//! [`ChatClient`], exposes the [`Tool`] capability interface the model may
//! invoke during a stage, and the [`StageExecutor`] seam the pipeline runs
//! against.

mod client;
mod executor;
mod tool;

pub use client::ChatClient;
pub use executor::{LlmStageExecutor, StageExecutor};
pub use tool::{Tool, find_tool, tool_definition};
