//! Core of the MeetBrief pipeline: stage prompts, the 4-stage executor,
//! search tool wiring, and briefing export.

pub mod briefing;
pub mod pipeline;
pub mod stages;
pub mod tools;

pub use briefing::{
    ExportedBriefing, default_export_filename, parse_export, render_export, write_export,
};
pub use pipeline::{ProgressReporter, SilentProgress, prepare_briefing};
pub use tools::ToolRegistry;
