//! "Briefing" screen — shows the generated document and exports it.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use meetbrief_shared::Briefing;

pub(crate) struct BriefingScreen {
    briefing: Option<Briefing>,
    scroll: u16,
    status: String,
}

impl BriefingScreen {
    pub(crate) fn new() -> Self {
        Self {
            briefing: None,
            scroll: 0,
            status: "No briefing yet — generate one from the Prepare tab.".to_string(),
        }
    }

    /// Install a freshly generated briefing and reset the view.
    pub(crate) fn set_briefing(&mut self, briefing: Briefing) {
        self.status = format!(
            "Briefing for {} · model {} · press s to save",
            briefing.request.participants_line(),
            briefing.model
        );
        self.briefing = Some(briefing);
        self.scroll = 0;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // Document
                Constraint::Length(3), // Status
            ])
            .split(area);

        let body = match &self.briefing {
            Some(b) => b.content.as_str(),
            None => "Run the pipeline from the Prepare tab to see the briefing here.",
        };

        let doc = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Meeting Brief "),
            );
        f.render_widget(doc, chunks[0]);

        let status = Paragraph::new(self.status.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        f.render_widget(status, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) {
        match code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Char('s') => self.export(),
            _ => {}
        }
    }

    /// Export the briefing to the working directory with the default name.
    fn export(&mut self) {
        let Some(briefing) = &self.briefing else {
            self.status = "Nothing to save yet.".to_string();
            return;
        };

        let filename = meetbrief_core::default_export_filename(briefing.generated_at);
        let path = std::path::PathBuf::from(&filename);
        match meetbrief_core::write_export(briefing, &path) {
            Ok(()) => self.status = format!("Saved to {filename}"),
            Err(e) => self.status = format!("Save failed: {e}"),
        }
    }
}
