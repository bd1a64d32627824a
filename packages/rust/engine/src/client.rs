//! OpenRouter chat client and the per-stage tool-call loop.
//!
//! The client speaks the OpenAI-compatible `/chat/completions` protocol with
//! function-calling. One [`ChatClient::run_stage`] call drives a bounded
//! loop: the model either answers with text (done) or requests tool calls,
//! which are executed and appended as `tool` messages before re-asking.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use meetbrief_shared::{MeetBriefError, OpenRouterConfig, Result, Stage, StagePrompt};

use crate::tool::{Tool, find_tool, tool_definition};

/// Request timeout for model calls.
const TIMEOUT_SECS: u64 = 60;

/// Default cap on tool-call rounds per stage.
const DEFAULT_MAX_TOOL_ROUNDS: u32 = 5;

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [serde_json::Value]>,
}

/// One conversation message. `content` is absent on assistant messages that
/// only carry tool calls; `tool_call_id` is present on tool-result messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

/// A tool invocation as carried on the wire (arguments are a JSON string).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: WireFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Explicitly constructed model client, dependency-injected into the
/// pipeline. Lifecycle is owned by the calling application.
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tool_rounds: u32,
}

impl ChatClient {
    /// Create a client from provider config and an API key.
    pub fn new(config: &OpenRouterConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| MeetBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.default_model.clone(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        })
    }

    /// Override the model (e.g. `google/gemini-2.5-flash`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the tool-round cap.
    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// The model ID this client sends.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Execute one stage: hand the rendered prompt and the stage's tool set
    /// to the model, resolve tool calls as they are requested, and return
    /// the final assistant text.
    #[instrument(skip_all, fields(stage = %stage, model = %self.model, tools = tools.len()))]
    pub async fn run_stage(
        &self,
        stage: Stage,
        prompt: &StagePrompt,
        tools: &[Arc<dyn Tool>],
    ) -> Result<String> {
        let definitions: Vec<serde_json::Value> =
            tools.iter().map(|t| tool_definition(t.as_ref())).collect();

        let mut messages = vec![
            ChatMessage::text("system", &prompt.system),
            ChatMessage::text(
                "user",
                format!(
                    "{}\n\nExpected output:\n{}",
                    prompt.instructions, prompt.expected_output
                ),
            ),
        ];

        for round in 0..=self.max_tool_rounds {
            let reply = self.complete(&messages, &definitions).await?;

            let Some(calls) = reply.tool_calls.clone().filter(|c| !c.is_empty()) else {
                let content = reply.content.unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(MeetBriefError::Engine(
                        "model returned neither content nor tool calls".into(),
                    ));
                }
                info!(rounds = round, "stage completed");
                return Ok(content);
            };

            debug!(round, calls = calls.len(), "model requested tool calls");
            messages.push(reply);

            for call in &calls {
                let output = self.dispatch(call, tools).await;
                messages.push(ChatMessage::tool_result(&call.id, output));
            }
        }

        Err(MeetBriefError::Engine(format!(
            "stage {stage} exceeded {} tool rounds without an answer",
            self.max_tool_rounds
        )))
    }

    /// Execute one requested tool call. Unknown tools and malformed argument
    /// strings become error payloads in the tool result, never faults.
    async fn dispatch(&self, call: &WireToolCall, tools: &[Arc<dyn Tool>]) -> String {
        let name = &call.function.name;
        let Some(tool) = find_tool(tools, name) else {
            warn!(tool = %name, "model requested unknown tool");
            return serde_json::json!({"error": format!("unknown tool '{name}'")}).to_string();
        };

        let args: serde_json::Value =
            serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::json!({}));

        tool.call(args).await
    }

    /// One POST to `/chat/completions`, returning the assistant message.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        definitions: &[serde_json::Value],
    ) -> Result<ChatMessage> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools: if definitions.is_empty() {
                None
            } else {
                Some(definitions)
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MeetBriefError::Engine(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeetBriefError::Engine(format!(
                "model API returned HTTP {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| MeetBriefError::Engine(format!("invalid response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| MeetBriefError::Engine("response contained no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ChatClient {
        let config = OpenRouterConfig {
            api_key_env: "OPENROUTER_API_KEY".into(),
            default_model: "test/model".into(),
            base_url: server.uri(),
        };
        ChatClient::new(&config, "test-key".into()).expect("build client")
    }

    fn prompt() -> StagePrompt {
        StagePrompt {
            system: "You are a research specialist.".into(),
            instructions: "Find participant profiles.".into(),
            expected_output: "A JSON array.".into(),
        }
    }

    /// Records every invocation so tests can assert on calls and arguments.
    struct RecordingTool {
        calls: Mutex<Vec<serde_json::Value>>,
        reply: String,
    }

    impl RecordingTool {
        fn new(reply: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn name(&self) -> &str {
            "lookup_person"
        }

        fn description(&self) -> &str {
            "Look up a participant"
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            })
        }

        async fn call(&self, args: serde_json::Value) -> String {
            self.calls.lock().expect("lock").push(args);
            self.reply.clone()
        }
    }

    fn text_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    fn tool_call_response(name: &str, arguments: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call-1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments}
                }]
            }}]
        })
    }

    #[tokio::test]
    async fn plain_text_reply_is_returned() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("the briefing")))
            .mount(&server)
            .await;

        let out = test_client(&server)
            .run_stage(Stage::Summary, &prompt(), &[])
            .await
            .expect("run stage");
        assert_eq!(out, "the briefing");
    }

    #[tokio::test]
    async fn tool_calls_are_executed_then_answer_returned() {
        let server = MockServer::start().await;
        let tool = Arc::new(RecordingTool::new(r#"{"name":"Alice","snippets":[]}"#));

        // Second round: the request now carries our tool result message.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{}, {}, {}, {"role": "tool", "tool_call_id": "call-1"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("done")))
            .mount(&server)
            .await;

        // First round: the model asks for one lookup.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(tool_call_response("lookup_person", r#"{"name":"Alice"}"#)),
            )
            .mount(&server)
            .await;

        let tools: Vec<Arc<dyn Tool>> = vec![tool.clone()];
        let out = test_client(&server)
            .run_stage(Stage::Research, &prompt(), &tools)
            .await
            .expect("run stage");

        assert_eq!(out, "done");
        let calls = tool.calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["name"], "Alice");
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_payload_not_fault() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{}, {}, {}, {"role": "tool"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("recovered")))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(tool_call_response("no_such_tool", "{}")),
            )
            .mount(&server)
            .await;

        let out = test_client(&server)
            .run_stage(Stage::Research, &prompt(), &[])
            .await
            .expect("run stage");
        assert_eq!(out, "recovered");
    }

    #[tokio::test]
    async fn tool_round_cap_is_enforced() {
        let server = MockServer::start().await;
        let tool = Arc::new(RecordingTool::new("{}"));

        // The model keeps asking for tools forever.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(tool_call_response("lookup_person", "{}")),
            )
            .mount(&server)
            .await;

        let tools: Vec<Arc<dyn Tool>> = vec![tool];
        let err = test_client(&server)
            .with_max_tool_rounds(2)
            .run_stage(Stage::Research, &prompt(), &tools)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tool rounds"));
    }

    #[tokio::test]
    async fn api_error_status_is_typed_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .run_stage(Stage::Summary, &prompt(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MeetBriefError::Engine(_)));
    }

    #[test]
    fn tool_result_message_serializes_with_call_id() {
        let msg = ChatMessage::tool_result("call-9", "payload".into());
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains(r#""role":"tool""#));
        assert!(json.contains(r#""tool_call_id":"call-9""#));
        assert!(!json.contains("tool_calls"));
    }

    #[test]
    fn assistant_tool_call_message_deserializes() {
        let json = r#"{
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "c1", "type": "function",
                "function": {"name": "lookup_person", "arguments": "{\"name\":\"A\"}"}
            }]
        }"#;
        let msg: ChatMessage = serde_json::from_str(json).expect("deserialize");
        let calls = msg.tool_calls.expect("tool calls");
        assert_eq!(calls[0].function.name, "lookup_person");
        assert!(msg.content.is_none());
    }
}
