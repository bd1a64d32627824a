//! "Prepare" screen — the meeting input form.
//!
//! Three free-text fields (participants, context, objective) with focus and
//! edit modes. Submission validates the fields into a `MeetingRequest`
//! before the pipeline is ever constructed; invalid input stays on the form
//! with a message.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use meetbrief_shared::MeetingRequest;

/// Which input field is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Participants,
    Context,
    Objective,
}

pub(crate) struct PrepareScreen {
    participants: String,
    context: String,
    objective: String,
    focused: Field,
    editing: bool,
    status: String,
    /// Set when the user submits a valid form; taken by the app.
    submission: Option<MeetingRequest>,
    /// True while a pipeline run is in flight (form is locked).
    pub running: bool,
}

impl PrepareScreen {
    pub(crate) fn new() -> Self {
        Self {
            participants: String::new(),
            context: String::new(),
            objective: String::new(),
            focused: Field::Participants,
            editing: false,
            status: "Fill in the meeting details and press Ctrl-Enter to generate.".to_string(),
            submission: None,
            running: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Take the pending submission, if the user just submitted a valid form.
    pub(crate) fn take_submission(&mut self) -> Option<MeetingRequest> {
        self.submission.take()
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Participants
                Constraint::Length(3), // Context
                Constraint::Length(3), // Objective
                Constraint::Length(3), // Action hint
                Constraint::Min(1),    // Status / progress
            ])
            .split(area);

        self.draw_field(
            f,
            chunks[0],
            Field::Participants,
            " Participants (comma-separated) ",
            &self.participants,
        );
        self.draw_field(f, chunks[1], Field::Context, " Meeting context ", &self.context);
        self.draw_field(f, chunks[2], Field::Objective, " Your objective ", &self.objective);

        // Action hint
        let hint = if self.running {
            "Generating briefing — see status below"
        } else if self.editing {
            "Type to edit · Esc to stop editing · Tab to next field"
        } else {
            "Enter to edit · Tab to next field · Ctrl-Enter to generate"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[3]);

        // Status area
        let status_block = Block::default()
            .borders(Borders::ALL)
            .title(" Status ");
        let status_text = Paragraph::new(self.status.as_str())
            .wrap(Wrap { trim: false })
            .block(status_block);
        f.render_widget(status_text, chunks[4]);
    }

    fn draw_field(&self, f: &mut Frame, area: Rect, field: Field, title: &str, value: &str) {
        let style = if self.focused == field && self.editing {
            Style::default().fg(Color::Yellow)
        } else if self.focused == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style);
        let text = Paragraph::new(value).block(block);
        f.render_widget(text, area);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if self.running {
            return;
        }

        // Ctrl-Enter submits from any mode.
        if code == KeyCode::Enter && modifiers.contains(KeyModifiers::CONTROL) {
            self.submit();
            return;
        }

        if self.editing {
            match code {
                KeyCode::Esc => {
                    self.editing = false;
                }
                KeyCode::Tab => {
                    self.editing = false;
                    self.next_field();
                }
                KeyCode::Backspace => {
                    self.current_field_mut().pop();
                }
                KeyCode::Char(c) => {
                    self.current_field_mut().push(c);
                }
                _ => {}
            }
        } else {
            match code {
                KeyCode::Enter => {
                    self.editing = true;
                }
                KeyCode::Tab => self.next_field(),
                KeyCode::BackTab => self.prev_field(),
                _ => {}
            }
        }
    }

    /// Validate the form and stash a submission for the app to pick up.
    fn submit(&mut self) {
        match MeetingRequest::from_form(&self.participants, &self.context, &self.objective) {
            Ok(request) => {
                self.editing = false;
                self.submission = Some(request);
            }
            Err(e) => {
                self.status = format!("Cannot generate: {e}");
            }
        }
    }

    fn current_field_mut(&mut self) -> &mut String {
        match self.focused {
            Field::Participants => &mut self.participants,
            Field::Context => &mut self.context,
            Field::Objective => &mut self.objective,
        }
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            Field::Participants => Field::Context,
            Field::Context => Field::Objective,
            Field::Objective => Field::Participants,
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            Field::Participants => Field::Objective,
            Field::Context => Field::Participants,
            Field::Objective => Field::Context,
        };
    }
}
