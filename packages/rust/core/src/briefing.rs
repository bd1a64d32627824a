//! Briefing export: render the final document to plain text with a fixed
//! header, write it to disk, and re-read exported files.
//!
//! The export format is stable: header fields and the briefing content
//! round-trip byte-for-byte through [`render_export`] / [`parse_export`].

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use meetbrief_shared::{Briefing, MeetBriefError, Result};

/// Timestamp format used in the export header.
const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used in default export file names.
const FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Header fields and content recovered from an exported briefing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBriefing {
    /// Header timestamp, verbatim (`YYYY-MM-DD HH:MM:SS`).
    pub generated_at: String,
    pub participants: String,
    pub context: String,
    pub objective: String,
    /// Briefing content, byte-for-byte.
    pub content: String,
}

/// Render a briefing as the plain-text export document.
pub fn render_export(briefing: &Briefing) -> String {
    format!(
        "MEETING PREPARATION BRIEF\n\
         Generated: {}\n\n\
         PARTICIPANTS: {}\n\
         CONTEXT: {}\n\
         OBJECTIVE: {}\n\n\
         BRIEF:\n{}",
        briefing.generated_at.format(HEADER_TIME_FORMAT),
        briefing.request.participants_line(),
        briefing.request.context,
        briefing.request.objective,
        briefing.content
    )
}

/// Parse an exported briefing document back into its header fields and
/// content.
pub fn parse_export(text: &str) -> Result<ExportedBriefing> {
    let rest = text
        .strip_prefix("MEETING PREPARATION BRIEF\nGenerated: ")
        .ok_or_else(|| MeetBriefError::validation("missing export header"))?;

    let (generated_at, rest) = split_at_marker(rest, "\n\nPARTICIPANTS: ")?;
    let (participants, rest) = split_at_marker(rest, "\nCONTEXT: ")?;
    let (context, rest) = split_at_marker(rest, "\nOBJECTIVE: ")?;
    let (objective, content) = split_at_marker(rest, "\n\nBRIEF:\n")?;

    Ok(ExportedBriefing {
        generated_at: generated_at.to_string(),
        participants: participants.to_string(),
        context: context.to_string(),
        objective: objective.to_string(),
        content: content.to_string(),
    })
}

fn split_at_marker<'a>(text: &'a str, marker: &str) -> Result<(&'a str, &'a str)> {
    text.find(marker)
        .map(|idx| (&text[..idx], &text[idx + marker.len()..]))
        .ok_or_else(|| {
            MeetBriefError::validation(format!("malformed export: missing '{}'", marker.trim()))
        })
}

/// Default export file name for a briefing generated at `ts`.
pub fn default_export_filename(ts: DateTime<Utc>) -> String {
    format!("meeting_brief_{}.txt", ts.format(FILE_TIME_FORMAT))
}

/// Write the rendered export to `path`.
pub fn write_export(briefing: &Briefing, path: &Path) -> Result<()> {
    let text = render_export(briefing);
    std::fs::write(path, text).map_err(|e| MeetBriefError::io(path, e))?;
    info!(path = %path.display(), "briefing exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use meetbrief_shared::{MeetingRequest, RunId};

    fn briefing() -> Briefing {
        Briefing {
            run_id: RunId::new(),
            request: MeetingRequest::from_form(
                "Alice Smith, Bob Lee",
                "Quarterly partnership review",
                "Secure renewal",
            )
            .expect("valid request"),
            content: "# Executive Summary\n\nAll good.\n\n# Participant Bios\n- Alice\n".into(),
            model: "test/model".into(),
            generated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            elapsed: std::time::Duration::from_secs(42),
        }
    }

    #[test]
    fn export_header_uses_expected_timestamp_format() {
        let text = render_export(&briefing());
        assert!(text.starts_with("MEETING PREPARATION BRIEF\nGenerated: 2026-03-14 09:26:53\n"));
        assert!(text.contains("PARTICIPANTS: Alice Smith, Bob Lee\n"));
        assert!(text.contains("CONTEXT: Quarterly partnership review\n"));
        assert!(text.contains("OBJECTIVE: Secure renewal\n"));
    }

    #[test]
    fn export_roundtrip_is_byte_for_byte() {
        let source = briefing();
        let text = render_export(&source);
        let parsed = parse_export(&text).expect("parse");

        assert_eq!(parsed.generated_at, "2026-03-14 09:26:53");
        assert_eq!(parsed.participants, source.request.participants_line());
        assert_eq!(parsed.context, source.request.context);
        assert_eq!(parsed.objective, source.request.objective);
        // Content survives exactly, including internal newlines.
        assert_eq!(parsed.content, source.content);
    }

    #[test]
    fn parse_rejects_non_export_text() {
        assert!(parse_export("just some text").is_err());
        assert!(parse_export("MEETING PREPARATION BRIEF\nGenerated: x").is_err());
    }

    #[test]
    fn default_filename_embeds_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            default_export_filename(ts),
            "meeting_brief_20260314_092653.txt"
        );
    }

    #[test]
    fn write_and_reread_export() {
        let dir = std::env::temp_dir().join(format!("mb-export-test-{}", RunId::new()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("brief.txt");

        let source = briefing();
        write_export(&source, &path).expect("write");

        let text = std::fs::read_to_string(&path).expect("read back");
        let parsed = parse_export(&text).expect("parse");
        assert_eq!(parsed.content, source.content);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
