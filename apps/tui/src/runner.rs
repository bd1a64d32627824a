//! Background pipeline runner for the TUI.
//!
//! The event loop must stay responsive, so the pipeline runs on its own
//! thread with a dedicated tokio runtime. Progress and the final result
//! come back over an unbounded channel the UI polls every tick.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::info;

use meetbrief_core::pipeline::ProgressReporter;
use meetbrief_engine::{ChatClient, LlmStageExecutor};
use meetbrief_search::{SerperClient, SerperOptions};
use meetbrief_semantic::ExaClient;
use meetbrief_shared::{
    Briefing, MeetingRequest, Result, Stage, load_config, read_api_key, validate_api_keys,
};

/// Events sent from the pipeline thread back to the UI.
pub(crate) enum RunEvent {
    Phase(String),
    Finished(Box<Briefing>),
    Failed(String),
}

/// Start a pipeline run in the background; returns the event receiver.
pub(crate) fn spawn_run(request: MeetingRequest) -> UnboundedReceiver<RunEvent> {
    let (tx, rx) = unbounded_channel();

    info!(participants = %request.participants_line(), "starting background pipeline run");

    std::thread::spawn(move || {
        let outcome = run_blocking(&request, tx.clone());
        if let Err(e) = outcome {
            let _ = tx.send(RunEvent::Failed(e.to_string()));
        }
    });

    rx
}

fn run_blocking(request: &MeetingRequest, tx: UnboundedSender<RunEvent>) -> Result<()> {
    let config = load_config()?;
    validate_api_keys(&config)?;

    let openrouter_key = read_api_key(&config.openrouter.api_key_env, "OpenRouter")?;
    let serper_key = read_api_key(&config.serper.api_key_env, "Serper")?;
    let exa_key = read_api_key(&config.exa.api_key_env, "Exa")?;

    let client = ChatClient::new(&config.openrouter, openrouter_key)?
        .with_max_tool_rounds(config.defaults.max_tool_rounds);

    let serper_options = SerperOptions {
        result_cap: config.defaults.result_cap,
        snippet_cap: config.defaults.snippet_cap,
        profile_domain: config.defaults.profile_domain.clone(),
    };
    let serper = Arc::new(SerperClient::new(&config.serper, serper_key, serper_options)?);
    let exa = Arc::new(ExaClient::new(&config.exa, exa_key)?);
    let registry = meetbrief_core::ToolRegistry::new(serper, exa, config.defaults.result_cap);

    let executor = LlmStageExecutor::new(client);
    let reporter = ChannelProgress { tx: tx.clone() };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| meetbrief_shared::MeetBriefError::Network(format!("runtime: {e}")))?;

    let briefing = runtime.block_on(meetbrief_core::prepare_briefing(
        request, &executor, &registry, &reporter,
    ))?;

    let _ = tx.send(RunEvent::Finished(Box::new(briefing)));
    Ok(())
}

/// Forwards pipeline progress into the UI channel.
struct ChannelProgress {
    tx: UnboundedSender<RunEvent>,
}

impl ProgressReporter for ChannelProgress {
    fn phase(&self, name: &str) {
        let _ = self.tx.send(RunEvent::Phase(name.to_string()));
    }

    fn stage_started(&self, stage: Stage) {
        let label = match stage {
            Stage::Research => "Researching participants...",
            Stage::IndustryAnalysis => "Analyzing industry trends...",
            Stage::Strategy => "Developing meeting strategy...",
            Stage::Summary => "Compiling final brief...",
        };
        let _ = self.tx.send(RunEvent::Phase(label.to_string()));
    }

    fn stage_finished(&self, _stage: Stage) {}

    fn done(&self, _briefing: &Briefing) {}
}
