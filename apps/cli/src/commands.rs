//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use meetbrief_core::pipeline::ProgressReporter;
use meetbrief_engine::{ChatClient, LlmStageExecutor};
use meetbrief_search::{SerperClient, SerperOptions};
use meetbrief_semantic::ExaClient;
use meetbrief_shared::{
    AppConfig, Briefing, MeetingRequest, Stage, config_file_path, init_config, load_config,
    read_api_key, validate_api_keys,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// MeetBrief — AI-prepared briefings for upcoming meetings.
#[derive(Parser)]
#[command(
    name = "meetbrief",
    version,
    about = "Prepare a meeting briefing from participants, context, and objective.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Prepare a briefing for an upcoming meeting.
    Prepare {
        /// Participant names, comma-separated (e.g. "Alice Smith, Bob Lee").
        #[arg(short, long)]
        participants: String,

        /// Meeting context: what is this meeting about?
        #[arg(short, long)]
        context: String,

        /// Your objective for the meeting.
        #[arg(short, long)]
        objective: String,

        /// Write the briefing to this file (defaults to stdout only).
        #[arg(long)]
        out: Option<String>,

        /// Model ID override (defaults to the configured model).
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "meetbrief=info",
        1 => "meetbrief=debug",
        _ => "meetbrief=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Prepare {
            participants,
            context,
            objective,
            out,
            model,
        } => {
            cmd_prepare(
                &participants,
                &context,
                &objective,
                out.as_deref(),
                model.as_deref(),
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_prepare(
    participants: &str,
    context: &str,
    objective: &str,
    out: Option<&str>,
    model: Option<&str>,
) -> Result<()> {
    // Validate API keys and inputs before doing anything
    let config = load_config()?;
    validate_api_keys(&config)?;

    let request = MeetingRequest::from_form(participants, context, objective)?;

    info!(
        participants = %request.participants_line(),
        model = model.unwrap_or(&config.openrouter.default_model),
        "preparing meeting briefing"
    );

    let (executor, registry) = build_pipeline_parts(&config, model)?;

    let reporter = CliProgress::new();
    let briefing =
        meetbrief_core::prepare_briefing(&request, &executor, &registry, &reporter).await?;

    // Print the briefing
    println!();
    println!("{}", briefing.content);
    println!();
    println!("  Run:     {}", briefing.run_id);
    println!("  Model:   {}", briefing.model);
    println!("  Time:    {:.1}s", briefing.elapsed.as_secs_f64());

    // Optional export
    if let Some(out) = out {
        let path = export_path(out, &briefing);
        meetbrief_core::write_export(&briefing, &path)?;
        println!("  Saved:   {}", path.display());
    }
    println!();

    Ok(())
}

/// Construct the executor and tool registry from config + environment.
fn build_pipeline_parts(
    config: &AppConfig,
    model: Option<&str>,
) -> Result<(LlmStageExecutor, meetbrief_core::ToolRegistry)> {
    let openrouter_key = read_api_key(&config.openrouter.api_key_env, "OpenRouter")?;
    let serper_key = read_api_key(&config.serper.api_key_env, "Serper")?;
    let exa_key = read_api_key(&config.exa.api_key_env, "Exa")?;

    let mut client = ChatClient::new(&config.openrouter, openrouter_key)?
        .with_max_tool_rounds(config.defaults.max_tool_rounds);
    if let Some(model) = model {
        client = client.with_model(model);
    }

    let serper_options = SerperOptions {
        result_cap: config.defaults.result_cap,
        snippet_cap: config.defaults.snippet_cap,
        profile_domain: config.defaults.profile_domain.clone(),
    };
    let serper = Arc::new(SerperClient::new(&config.serper, serper_key, serper_options)?);
    let exa = Arc::new(ExaClient::new(&config.exa, exa_key)?);

    let registry = meetbrief_core::ToolRegistry::new(serper, exa, config.defaults.result_cap);

    Ok((LlmStageExecutor::new(client), registry))
}

/// Resolve the export path: a directory gets the default file name.
fn export_path(out: &str, briefing: &Briefing) -> PathBuf {
    let path = PathBuf::from(out);
    if path.is_dir() {
        path.join(meetbrief_core::default_export_filename(
            briefing.generated_at,
        ))
    } else {
        path
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn stage_started(&self, stage: Stage) {
        let label = match stage {
            Stage::Research => "Researching participants...",
            Stage::IndustryAnalysis => "Analyzing industry trends...",
            Stage::Strategy => "Developing meeting strategy...",
            Stage::Summary => "Compiling final brief...",
        };
        self.spinner.set_message(label);
    }

    fn stage_finished(&self, _stage: Stage) {}

    fn done(&self, _briefing: &Briefing) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let path = config_file_path()?;
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config).map_err(|e| eyre!("render config: {e}"))?;

    println!("# {}", path.display());
    println!("{rendered}");
    Ok(())
}
