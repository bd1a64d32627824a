//! Search tool implementations and the per-stage tool registry.
//!
//! Each tool wraps one provider operation behind the engine's [`Tool`]
//! capability interface. Tool calls never fail: provider errors become
//! `{"error": "..."}` payloads the model receives as data, so one failed
//! lookup never aborts a stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use meetbrief_engine::Tool;
use meetbrief_search::SerperClient;
use meetbrief_semantic::{ExaClient, parse_id_list};
use meetbrief_shared::Stage;

/// Serialize a success payload, or fall back to an error payload.
fn json_payload<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({"error": e.to_string()}).to_string())
}

fn error_payload(message: String) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn str_arg(args: &serde_json::Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Keyword tools (Serper)
// ---------------------------------------------------------------------------

/// Look up one participant's professional profile.
pub struct PersonLookupTool {
    serper: Arc<SerperClient>,
}

#[async_trait]
impl Tool for PersonLookupTool {
    fn name(&self) -> &str {
        "lookup_person"
    }

    fn description(&self) -> &str {
        "Search for a participant's professional profile and return their name, \
         profile URL, and result snippets as JSON."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Participant display name"}
            },
            "required": ["name"]
        })
    }

    async fn call(&self, args: serde_json::Value) -> String {
        let Some(name) = str_arg(&args, "name") else {
            return error_payload("lookup_person requires a non-empty 'name'".into());
        };

        match self.serper.lookup_person(&name).await {
            Ok(record) => json_payload(&record),
            Err(e) => {
                warn!(name, error = %e, "person lookup failed");
                error_payload(format!("person lookup failed: {e}"))
            }
        }
    }
}

/// General keyword web search.
pub struct WebSearchTool {
    serper: Arc<SerperClient>,
    limit: usize,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web for a query and return the top results as \
         {title, url, snippet} JSON."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Free-text search query"}
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: serde_json::Value) -> String {
        let Some(query) = str_arg(&args, "query") else {
            return error_payload("search_web requires a non-empty 'query'".into());
        };

        match self.serper.search(&query, self.limit).await {
            Ok(outcome) => json_payload(&outcome),
            Err(e) => {
                warn!(query, error = %e, "web search failed");
                error_payload(format!("web search failed: {e}"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Semantic tools (Exa)
// ---------------------------------------------------------------------------

/// Semantic content search.
pub struct SemanticSearchTool {
    exa: Arc<ExaClient>,
}

#[async_trait]
impl Tool for SemanticSearchTool {
    fn name(&self) -> &str {
        "search_content"
    }

    fn description(&self) -> &str {
        "Semantic search over web content; returns {id, title, url, text} results."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Free-text search query"}
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: serde_json::Value) -> String {
        let Some(query) = str_arg(&args, "query") else {
            return error_payload("search_content requires a non-empty 'query'".into());
        };

        match self.exa.search(&query).await {
            Ok(results) => json_payload(&results),
            Err(e) => error_payload(format!("semantic search failed: {e}")),
        }
    }
}

/// Find pages similar to a URL.
pub struct FindSimilarTool {
    exa: Arc<ExaClient>,
}

#[async_trait]
impl Tool for FindSimilarTool {
    fn name(&self) -> &str {
        "find_similar"
    }

    fn description(&self) -> &str {
        "Find pages similar to a given URL."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "Page URL to find similar pages for"}
            },
            "required": ["url"]
        })
    }

    async fn call(&self, args: serde_json::Value) -> String {
        let Some(url) = str_arg(&args, "url") else {
            return error_payload("find_similar requires a non-empty 'url'".into());
        };

        match self.exa.find_similar(&url).await {
            Ok(results) => json_payload(&results),
            Err(e) => error_payload(format!("find similar failed: {e}")),
        }
    }
}

/// Fetch full page content for a set of result IDs.
pub struct FetchContentsTool {
    exa: Arc<ExaClient>,
}

#[async_trait]
impl Tool for FetchContentsTool {
    fn name(&self) -> &str {
        "get_contents"
    }

    fn description(&self) -> &str {
        "Fetch page content for result IDs (JSON array or comma-separated), \
         truncated per item."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "ids": {
                    "type": "string",
                    "description": "Result IDs as a JSON array or comma-separated list"
                }
            },
            "required": ["ids"]
        })
    }

    async fn call(&self, args: serde_json::Value) -> String {
        // The model may send the list as a JSON array or as a single string;
        // both go through the structured parser, never evaluation.
        let ids = match args.get("ids") {
            Some(serde_json::Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect::<Vec<_>>(),
            Some(serde_json::Value::String(s)) => match parse_id_list(s) {
                Ok(ids) => ids,
                Err(e) => return format!("Error fetching contents: {e}"),
            },
            _ => return "Error fetching contents: missing 'ids' argument".to_string(),
        };

        if ids.is_empty() {
            return "Error fetching contents: identifier list is empty".to_string();
        }

        match self.exa.contents(&ids).await {
            Ok(contents) => contents.join("\n\n"),
            Err(e) => format!("Error fetching contents: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Per-stage tool sets.
///
/// Research uses the keyword tools; the analysis/strategy/summary stages use
/// the semantic tools. The engine decides at runtime whether and how often to
/// invoke them.
pub struct ToolRegistry {
    keyword: Vec<Arc<dyn Tool>>,
    semantic: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(serper: Arc<SerperClient>, exa: Arc<ExaClient>, search_limit: usize) -> Self {
        let keyword: Vec<Arc<dyn Tool>> = vec![
            Arc::new(PersonLookupTool {
                serper: serper.clone(),
            }),
            Arc::new(WebSearchTool {
                serper,
                limit: search_limit,
            }),
        ];

        let semantic: Vec<Arc<dyn Tool>> = vec![
            Arc::new(SemanticSearchTool { exa: exa.clone() }),
            Arc::new(FindSimilarTool { exa: exa.clone() }),
            Arc::new(FetchContentsTool { exa }),
        ];

        Self { keyword, semantic }
    }

    /// The tool set offered to the engine for the given stage.
    pub fn for_stage(&self, stage: Stage) -> &[Arc<dyn Tool>] {
        match stage {
            Stage::Research => &self.keyword,
            Stage::IndustryAnalysis | Stage::Strategy | Stage::Summary => &self.semantic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetbrief_shared::{ExaConfig, SerperConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn registry_against(server: &MockServer) -> ToolRegistry {
        let serper_config = SerperConfig {
            api_key_env: "SERPER_API_KEY".into(),
            endpoint: format!("{}/search", server.uri()),
        };
        let exa_config = ExaConfig {
            api_key_env: "EXA_API_KEY".into(),
            base_url: server.uri(),
        };
        let serper = Arc::new(
            SerperClient::new(&serper_config, "k".into(), Default::default()).expect("serper"),
        );
        let exa = Arc::new(ExaClient::new(&exa_config, "k".into()).expect("exa"));
        ToolRegistry::new(serper, exa, 3)
    }

    #[test]
    fn stage_tool_sets_match_agent_assignments() {
        // Registry construction needs no network; use placeholder endpoints.
        let serper = Arc::new(
            SerperClient::new(&SerperConfig::default(), "k".into(), Default::default())
                .expect("serper"),
        );
        let exa = Arc::new(ExaClient::new(&ExaConfig::default(), "k".into()).expect("exa"));
        let registry = ToolRegistry::new(serper, exa, 3);

        let research: Vec<&str> = registry
            .for_stage(Stage::Research)
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(research, vec!["lookup_person", "search_web"]);

        for stage in [Stage::IndustryAnalysis, Stage::Strategy, Stage::Summary] {
            let names: Vec<&str> = registry
                .for_stage(stage)
                .iter()
                .map(|t| t.name())
                .collect();
            assert_eq!(names, vec!["search_content", "find_similar", "get_contents"]);
        }
    }

    #[tokio::test]
    async fn lookup_failure_becomes_error_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let registry = registry_against(&server).await;
        let lookup = &registry.for_stage(Stage::Research)[0];

        let out = lookup.call(serde_json::json!({"name": "Alice Smith"})).await;
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("payload is JSON");
        assert!(parsed["error"].as_str().expect("error field").contains("500"));
    }

    #[tokio::test]
    async fn lookup_success_serializes_person_record() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "organic": [{
                "title": "Alice",
                "link": "https://linkedin.com/in/alice",
                "snippet": "VP of Sales"
            }]
        });
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let registry = registry_against(&server).await;
        let lookup = &registry.for_stage(Stage::Research)[0];

        let out = lookup.call(serde_json::json!({"name": "Alice Smith"})).await;
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("payload is JSON");
        assert_eq!(parsed["name"], "Alice Smith");
        assert_eq!(parsed["linkedin_url"], "https://linkedin.com/in/alice");
        assert_eq!(parsed["snippets"][0], "VP of Sales");
    }

    #[tokio::test]
    async fn missing_argument_becomes_error_payload() {
        let server = MockServer::start().await;
        let registry = registry_against(&server).await;
        let lookup = &registry.for_stage(Stage::Research)[0];

        let out = lookup.call(serde_json::json!({})).await;
        assert!(out.contains("error"));
        assert!(out.contains("name"));
    }

    #[tokio::test]
    async fn get_contents_rejects_malformed_id_list_with_prefix() {
        let server = MockServer::start().await;
        let registry = registry_against(&server).await;
        let contents = &registry.for_stage(Stage::Summary)[2];

        let out = contents.call(serde_json::json!({"ids": "  ,  "})).await;
        assert!(out.starts_with("Error fetching contents:"));
    }

    #[tokio::test]
    async fn get_contents_joins_fetched_items() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "results": [
                {"id": "a", "text": "first page"},
                {"id": "b", "text": "second page"}
            ]
        });
        Mock::given(method("POST"))
            .and(path("/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let registry = registry_against(&server).await;
        let contents = &registry.for_stage(Stage::Summary)[2];

        let out = contents.call(serde_json::json!({"ids": "a, b"})).await;
        assert_eq!(out, "first page\n\nsecond page");
    }
}
