//! Core domain types for the meeting-briefing pipeline.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MeetBriefError, Result};

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// MeetingRequest
// ---------------------------------------------------------------------------

/// The three meeting inputs, immutable for the lifetime of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    /// Participant display names, in input order.
    pub participants: Vec<String>,
    /// Free-text meeting context.
    pub context: String,
    /// Free-text meeting objective.
    pub objective: String,
}

impl MeetingRequest {
    /// Build a request from the three raw form fields.
    ///
    /// The participants field is split on commas and trimmed; empty names are
    /// dropped. Fails when any field is empty so the pipeline is never
    /// invoked with a blank request (boundary check owned by the caller).
    pub fn from_form(participants: &str, context: &str, objective: &str) -> Result<Self> {
        let names: Vec<String> = participants
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if names.is_empty() {
            return Err(MeetBriefError::validation(
                "participants must contain at least one name",
            ));
        }
        if context.trim().is_empty() {
            return Err(MeetBriefError::validation("context must not be empty"));
        }
        if objective.trim().is_empty() {
            return Err(MeetBriefError::validation("objective must not be empty"));
        }

        Ok(Self {
            participants: names,
            context: context.trim().to_string(),
            objective: objective.trim().to_string(),
        })
    }

    /// Participants joined back into display form ("Alice Smith, Bob Lee").
    pub fn participants_line(&self) -> String {
        self.participants.join(", ")
    }
}

// ---------------------------------------------------------------------------
// Search result shapes
// ---------------------------------------------------------------------------

/// Structured result of looking up one participant's public profile.
///
/// Serialized with the `linkedin_url` wire name because the payload is handed
/// to the model verbatim as tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Display name as searched.
    pub name: String,
    /// Profile URL on the target professional-network domain, if any result
    /// linked there.
    #[serde(rename = "linkedin_url")]
    pub profile_url: Option<String>,
    /// Result snippets in provider order (bounded, duplicates kept).
    pub snippets: Vec<String>,
}

/// One keyword-search hit. Missing provider fields become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Outcome of a general web search.
///
/// A provider returning zero organic results is not an error: `results` is
/// empty and `note` explains why, distinct from the transport-error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One semantic-search hit. Missing provider fields become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One step of the meeting-briefing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Research,
    IndustryAnalysis,
    Strategy,
    Summary,
}

impl Stage {
    /// All stages in execution order (dependencies always precede dependents).
    pub fn all() -> [Stage; 4] {
        [
            Stage::Research,
            Stage::IndustryAnalysis,
            Stage::Strategy,
            Stage::Summary,
        ]
    }

    /// The fixed, acyclic dependency list of this stage.
    ///
    /// Research and IndustryAnalysis are independent; Strategy requires both;
    /// Summary requires all three.
    pub fn dependencies(&self) -> &'static [Stage] {
        match self {
            Stage::Research | Stage::IndustryAnalysis => &[],
            Stage::Strategy => &[Stage::Research, Stage::IndustryAnalysis],
            Stage::Summary => &[Stage::Research, Stage::IndustryAnalysis, Stage::Strategy],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Research => write!(f, "Research"),
            Stage::IndustryAnalysis => write!(f, "IndustryAnalysis"),
            Stage::Strategy => write!(f, "Strategy"),
            Stage::Summary => write!(f, "Summary"),
        }
    }
}

// ---------------------------------------------------------------------------
// StageOutput / StageOutputs
// ---------------------------------------------------------------------------

/// The recorded result of one stage's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: Stage,
    /// Free-form text or structured JSON as returned by the engine.
    pub content: String,
}

/// Completed stage outputs for one run, at most one per stage.
#[derive(Debug, Clone, Default)]
pub struct StageOutputs {
    outputs: HashMap<Stage, StageOutput>,
}

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage's output, replacing any previous one for that stage.
    pub fn insert(&mut self, output: StageOutput) {
        self.outputs.insert(output.stage, output);
    }

    pub fn get(&self, stage: Stage) -> Option<&StageOutput> {
        self.outputs.get(&stage)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.outputs.contains_key(&stage)
    }

    /// Fetch a dependency's content, failing with a validation error when the
    /// stage has not produced an output yet.
    pub fn require(&self, stage: Stage) -> Result<&str> {
        self.outputs
            .get(&stage)
            .map(|o| o.content.as_str())
            .ok_or_else(|| {
                MeetBriefError::validation(format!("missing required output for stage {stage}"))
            })
    }
}

// ---------------------------------------------------------------------------
// StagePrompt
// ---------------------------------------------------------------------------

/// Rendered prompt for one stage: a system role description, the task
/// instructions, and a description of the expected output shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    pub system: String,
    pub instructions: String,
    pub expected_output: String,
}

// ---------------------------------------------------------------------------
// Briefing
// ---------------------------------------------------------------------------

/// The pipeline's final artifact: the Summary stage's output plus run
/// metadata. No further mutation after creation.
#[derive(Debug, Clone)]
pub struct Briefing {
    pub run_id: RunId,
    pub request: MeetingRequest,
    /// The briefing document text.
    pub content: String,
    /// Model ID that produced the briefing.
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub elapsed: Duration,
}
