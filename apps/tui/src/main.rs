//! MeetBrief TUI — interactive terminal front-end for the briefing pipeline.
//!
//! Provides a form for the meeting inputs (participants, context,
//! objective), live progress while the pipeline runs, and a result screen
//! with export, built with `ratatui` + `crossterm`.

mod app;
mod runner;
mod screens;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    app::run()
}
