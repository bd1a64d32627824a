//! Semantic-search provider wrapper (Exa).
//!
//! Three stateless, single-call operations:
//! - [`ExaClient::search`] — neural content search for a free-text query
//! - [`ExaClient::find_similar`] — pages similar to a given URL
//! - [`ExaClient::contents`] — full page text for a set of result IDs,
//!   truncated per item
//!
//! Identifier lists arrive from the model as a single string and are parsed
//! with [`parse_id_list`] — a structured parse (JSON array or
//! comma-separated), never evaluation of caller input.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use meetbrief_shared::{ExaConfig, MeetBriefError, Result, SemanticResult};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("MeetBrief/", env!("CARGO_PKG_VERSION"));

/// Request timeout for search calls.
const TIMEOUT_SECS: u64 = 30;

/// Results requested per search/find-similar call.
const NUM_RESULTS: usize = 3;

/// Characters of page text kept per fetched content item.
pub const CONTENT_TRUNCATE_CHARS: usize = 1000;

// ---------------------------------------------------------------------------
// Wire types (provider-specific JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    query: String,
    num_results: usize,
    use_autoprompt: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindSimilarRequest {
    url: String,
    num_results: usize,
}

#[derive(Debug, Serialize)]
struct ContentsRequest {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    #[serde(default)]
    results: Vec<WireResult>,
}

/// One result; every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    text: String,
}

impl From<WireResult> for SemanticResult {
    fn from(r: WireResult) -> Self {
        Self {
            id: r.id,
            title: r.title,
            url: r.url,
            text: r.text,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Exa search client. One outbound network call per operation, no caching.
pub struct ExaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ExaClient {
    /// Create a client for the given API base and key.
    pub fn new(config: &ExaConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| MeetBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Neural content search for a free-text query.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SemanticResult>> {
        let request = SearchRequest {
            query: query.to_string(),
            num_results: NUM_RESULTS,
            use_autoprompt: true,
        };
        let envelope = self.post("/search", &request).await?;
        Ok(envelope.results.into_iter().map(Into::into).collect())
    }

    /// Find pages similar to the given URL. The URL is validated before the
    /// provider is contacted.
    #[instrument(skip(self))]
    pub async fn find_similar(&self, target: &str) -> Result<Vec<SemanticResult>> {
        Url::parse(target)
            .map_err(|e| MeetBriefError::validation(format!("invalid URL '{target}': {e}")))?;

        let request = FindSimilarRequest {
            url: target.to_string(),
            num_results: NUM_RESULTS,
        };
        let envelope = self.post("/findSimilar", &request).await?;
        Ok(envelope.results.into_iter().map(Into::into).collect())
    }

    /// Fetch full page text for a set of result IDs, each truncated to the
    /// first [`CONTENT_TRUNCATE_CHARS`] characters.
    #[instrument(skip(self), fields(ids = ids.len()))]
    pub async fn contents(&self, ids: &[String]) -> Result<Vec<String>> {
        let request = ContentsRequest { ids: ids.to_vec() };
        let envelope = self.post("/contents", &request).await?;

        Ok(envelope
            .results
            .into_iter()
            .map(|r| truncate_chars(&r.text, CONTENT_TRUNCATE_CHARS))
            .collect())
    }

    async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<ResultsEnvelope> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(%url, "semantic search request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| MeetBriefError::Semantic(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeetBriefError::Semantic(format!(
                "provider returned HTTP {status}"
            )));
        }

        response
            .json::<ResultsEnvelope>()
            .await
            .map_err(|e| MeetBriefError::Semantic(format!("invalid response body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Identifier-list parsing
// ---------------------------------------------------------------------------

/// Parse a caller-supplied identifier list.
///
/// Accepts a JSON string array (`["a", "b"]`) or a comma-separated list
/// (`a, b`). Never evaluates the input. Fails when no identifiers remain
/// after trimming.
pub fn parse_id_list(input: &str) -> Result<Vec<String>> {
    let trimmed = input.trim();

    if let Ok(ids) = serde_json::from_str::<Vec<String>>(trimmed) {
        let ids: Vec<String> = ids
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(MeetBriefError::validation("identifier list is empty"));
        }
        return Ok(ids);
    }

    let ids: Vec<String> = trimmed
        .split(',')
        .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if ids.is_empty() {
        return Err(MeetBriefError::validation(format!(
            "could not parse identifier list from '{input}'"
        )));
    }

    Ok(ids)
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ExaClient {
        let config = ExaConfig {
            api_key_env: "EXA_API_KEY".into(),
            base_url: server.uri(),
        };
        ExaClient::new(&config, "test-key".into()).expect("build client")
    }

    #[tokio::test]
    async fn search_maps_results() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "results": [
                {"id": "a1", "title": "Trends 2026", "url": "https://example.com/t", "text": "body"},
                {"id": "a2", "url": "https://example.com/u"}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(
                serde_json::json!({"numResults": 3, "useAutoprompt": true}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let results = test_client(&server)
            .search("industry trends")
            .await
            .expect("search");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a1");
        assert_eq!(results[1].title, "");
        assert_eq!(results[1].text, "");
    }

    #[tokio::test]
    async fn find_similar_rejects_invalid_url() {
        let server = MockServer::start().await;
        let err = test_client(&server)
            .find_similar("not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, MeetBriefError::Validation { .. }));
    }

    #[tokio::test]
    async fn find_similar_posts_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/findSimilar"))
            .and(body_partial_json(
                serde_json::json!({"url": "https://example.com/page"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"results": [{"id": "x"}]})),
            )
            .mount(&server)
            .await;

        let results = test_client(&server)
            .find_similar("https://example.com/page")
            .await
            .expect("find similar");
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn contents_truncates_each_item() {
        let server = MockServer::start().await;

        let long_text = "x".repeat(2500);
        let body = serde_json::json!({
            "results": [
                {"id": "a", "text": long_text},
                {"id": "b", "text": "short"}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let contents = test_client(&server)
            .contents(&["a".into(), "b".into()])
            .await
            .expect("contents");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].chars().count(), CONTENT_TRUNCATE_CHARS);
        assert_eq!(contents[1], "short");
    }

    #[tokio::test]
    async fn http_error_status_is_typed_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = test_client(&server).search("q").await.unwrap_err();
        assert!(matches!(err, MeetBriefError::Semantic(_)));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn id_list_parses_json_array() {
        let ids = parse_id_list(r#"["a1", "b2", "c3"]"#).expect("parse");
        assert_eq!(ids, vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn id_list_parses_comma_separated() {
        let ids = parse_id_list("a1, b2 ,c3").expect("parse");
        assert_eq!(ids, vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn id_list_strips_stray_quotes() {
        let ids = parse_id_list(r#""a1", 'b2'"#).expect("parse");
        assert_eq!(ids, vec!["a1", "b2"]);
    }

    #[test]
    fn id_list_rejects_empty_input() {
        assert!(parse_id_list("").is_err());
        assert!(parse_id_list("  , , ").is_err());
        assert!(parse_id_list("[]").is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "héllo wörld".repeat(200);
        let out = truncate_chars(&text, 1000);
        assert_eq!(out.chars().count(), 1000);
        // Must not panic or split a multi-byte char.
        assert!(text.starts_with(&out));
    }
}
