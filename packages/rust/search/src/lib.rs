//! Keyword-search provider wrapper (Serper).
//!
//! Two operations, both single-call and stateless:
//! - [`SerperClient::lookup_person`] — one search biased toward a
//!   professional-network domain, reduced to a [`PersonRecord`]
//! - [`SerperClient::search`] — one raw-query search, reduced to a bounded
//!   list of `{title, url, snippet}` results
//!
//! Transport, HTTP-status, and parse failures surface as typed errors at
//! this boundary; the tool layer upstream converts them to displayable
//! error payloads. No retries, no caching: repeated lookups re-issue the
//! HTTP call.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use meetbrief_shared::{
    MeetBriefError, PersonRecord, Result, SearchOutcome, SearchResult, SerperConfig,
};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("MeetBrief/", env!("CARGO_PKG_VERSION"));

/// Request timeout for search calls.
const TIMEOUT_SECS: u64 = 30;

/// Annotation returned with an empty (but successful) search.
pub const NO_RESULTS_NOTE: &str = "no results found";

// ---------------------------------------------------------------------------
// Wire types (provider-specific JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SerperRequest {
    q: String,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

/// One organic hit; every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Options controlling result shaping.
#[derive(Debug, Clone)]
pub struct SerperOptions {
    /// Maximum organic results examined per call.
    pub result_cap: usize,
    /// Maximum snippets kept per person lookup.
    pub snippet_cap: usize,
    /// Domain fragment identifying a profile link (e.g. `linkedin.com/in`).
    pub profile_domain: String,
}

impl Default for SerperOptions {
    fn default() -> Self {
        Self {
            result_cap: 3,
            snippet_cap: 3,
            profile_domain: "linkedin.com/in".into(),
        }
    }
}

/// Serper search client. One outbound network call per operation.
pub struct SerperClient {
    client: Client,
    api_key: String,
    endpoint: String,
    options: SerperOptions,
}

impl SerperClient {
    /// Create a client for the given endpoint and key.
    pub fn new(config: &SerperConfig, api_key: String, options: SerperOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| MeetBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            options,
        })
    }

    /// Look up one participant's public profile.
    ///
    /// Issues a single search restricted to the configured profile domain.
    /// The first result whose link matches the domain becomes `profile_url`
    /// (first match wins, no re-sorting); every non-empty snippet is kept in
    /// result order up to the snippet cap, duplicates not filtered.
    #[instrument(skip(self))]
    pub async fn lookup_person(&self, name: &str) -> Result<PersonRecord> {
        let query = format!("LinkedIn {name} site:{}", self.options.profile_domain);
        let response = self.request(&query).await?;

        let mut record = PersonRecord {
            name: name.to_string(),
            profile_url: None,
            snippets: Vec::new(),
        };

        for result in response.organic.iter().take(self.options.result_cap) {
            if record.profile_url.is_none() && result.link.contains(&self.options.profile_domain) {
                record.profile_url = Some(result.link.clone());
            }
            if !result.snippet.is_empty() && record.snippets.len() < self.options.snippet_cap {
                record.snippets.push(result.snippet.clone());
            }
        }

        debug!(
            name,
            has_profile = record.profile_url.is_some(),
            snippets = record.snippets.len(),
            "person lookup complete"
        );

        Ok(record)
    }

    /// General web search with the raw query, no domain restriction.
    ///
    /// `limit` caps the number of results returned; zero provider results is
    /// not an error and yields an empty outcome with [`NO_RESULTS_NOTE`].
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchOutcome> {
        let response = self.request(query).await?;

        let results: Vec<SearchResult> = response
            .organic
            .into_iter()
            .take(limit)
            .map(|r| SearchResult {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
            })
            .collect();

        let note = if results.is_empty() {
            Some(NO_RESULTS_NOTE.to_string())
        } else {
            None
        };

        Ok(SearchOutcome { results, note })
    }

    /// Issue one POST to the provider and decode the organic results.
    async fn request(&self, query: &str) -> Result<SerperResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query.to_string(),
                num: self.options.result_cap,
            })
            .send()
            .await
            .map_err(|e| MeetBriefError::Search(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeetBriefError::Search(format!(
                "provider returned HTTP {status}"
            )));
        }

        response
            .json::<SerperResponse>()
            .await
            .map_err(|e| MeetBriefError::Search(format!("invalid response body: {e}")))
    }
}
