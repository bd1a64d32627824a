//! Stage execution seam.
//!
//! The pipeline depends on [`StageExecutor`] rather than the concrete chat
//! client, so tests can substitute recording stubs and assert execution
//! order without any network.

use std::sync::Arc;

use async_trait::async_trait;

use meetbrief_shared::{Result, Stage, StagePrompt};

use crate::client::ChatClient;
use crate::tool::Tool;

/// Executes one stage against the model execution engine.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    /// Run the stage to completion and return its output text.
    async fn execute(
        &self,
        stage: Stage,
        prompt: &StagePrompt,
        tools: &[Arc<dyn Tool>],
    ) -> Result<String>;

    /// Model identifier recorded in the briefing metadata.
    fn model(&self) -> &str;
}

/// The production executor: wraps a [`ChatClient`].
pub struct LlmStageExecutor {
    client: ChatClient,
}

impl LlmStageExecutor {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StageExecutor for LlmStageExecutor {
    async fn execute(
        &self,
        stage: Stage,
        prompt: &StagePrompt,
        tools: &[Arc<dyn Tool>],
    ) -> Result<String> {
        self.client.run_stage(stage, prompt, tools).await
    }

    fn model(&self) -> &str {
        self.client.model()
    }
}
