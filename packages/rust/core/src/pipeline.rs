//! The meeting-briefing pipeline: a static 4-node DAG executed in
//! dependency order.
//!
//! Research and IndustryAnalysis are independent and run first (in that
//! order; nothing depends on which finishes before the other). Strategy runs
//! once both exist; Summary runs last with all three prior outputs. A stage
//! never executes before every stage it depends on has produced an output.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use meetbrief_engine::StageExecutor;
use meetbrief_shared::{
    Briefing, MeetBriefError, MeetingRequest, Result, RunId, Stage, StageOutput, StageOutputs,
};

use crate::stages;
use crate::tools::ToolRegistry;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a stage begins executing.
    fn stage_started(&self, stage: Stage);
    /// Called when a stage has produced its output.
    fn stage_finished(&self, stage: Stage);
    /// Called when the pipeline completes.
    fn done(&self, briefing: &Briefing);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage) {}
    fn done(&self, _briefing: &Briefing) {}
}

/// Run the full briefing pipeline.
///
/// 1. Research — one profile lookup per participant
/// 2. IndustryAnalysis — trends/challenges/opportunities narrative
/// 3. Strategy — talking points from the two outputs above
/// 4. Summary — the final multi-section briefing
///
/// A failing stage aborts the run with an error naming that stage; tool
/// failures inside a stage degrade to data and never abort.
#[instrument(skip_all, fields(participants = request.participants.len()))]
pub async fn prepare_briefing(
    request: &MeetingRequest,
    executor: &dyn StageExecutor,
    tools: &ToolRegistry,
    progress: &dyn ProgressReporter,
) -> Result<Briefing> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, participants = %request.participants_line(), "starting briefing pipeline");

    let mut outputs = StageOutputs::new();

    for stage in Stage::all() {
        // Dependency invariant: every required output must already exist.
        for dep in stage.dependencies() {
            if !outputs.contains(*dep) {
                return Err(MeetBriefError::validation(format!(
                    "stage {stage} scheduled before its dependency {dep} completed"
                )));
            }
        }

        progress.phase(&format!("Running {stage}"));
        progress.stage_started(stage);

        let prompt = stages::build(stage, request, &outputs)?;
        let content = executor
            .execute(stage, &prompt, tools.for_stage(stage))
            .await
            .map_err(|e| MeetBriefError::stage(stage.to_string(), e.to_string()))?;

        info!(%stage, chars = content.len(), "stage complete");
        outputs.insert(StageOutput { stage, content });
        progress.stage_finished(stage);
    }

    let content = outputs.require(Stage::Summary)?.to_string();

    let briefing = Briefing {
        run_id,
        request: request.clone(),
        content,
        model: executor.model().to_string(),
        generated_at: Utc::now(),
        elapsed: start.elapsed(),
    };

    progress.done(&briefing);

    info!(
        run_id = %briefing.run_id,
        model = %briefing.model,
        elapsed_ms = briefing.elapsed.as_millis(),
        "briefing pipeline complete"
    );

    Ok(briefing)
}
