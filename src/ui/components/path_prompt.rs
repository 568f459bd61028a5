use std::path::PathBuf;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Modal destination-path input, standing in for the desktop save dialog.
/// Confirming an empty line or pressing Esc cancels; the caller must not
/// touch the filesystem in that case.
pub struct PathPromptState {
    pub title: &'static str,
    pub input: String,
}

pub enum PathPromptAction {
    Confirm(PathBuf),
    Cancel,
}

impl PathPromptState {
    pub fn new(title: &'static str, suggested: String) -> Self {
        Self {
            title,
            input: suggested,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<PathPromptAction> {
        match key {
            KeyCode::Esc => Some(PathPromptAction::Cancel),
            KeyCode::Enter => {
                let trimmed = self.input.trim();
                if trimmed.is_empty() {
                    Some(PathPromptAction::Cancel)
                } else {
                    Some(PathPromptAction::Confirm(PathBuf::from(trimmed)))
                }
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            _ => None,
        }
    }
}

pub fn render_path_prompt<B: Backend>(frame: &mut Frame<B>, state: &PathPromptState) {
    let area = centered_rect(70, 20, frame.size());
    frame.render_widget(Clear, area);

    let body = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(format!("{}|", state.input)),
        Spans::from(""),
        Spans::from("<Enter> Save | <Esc> Cancel"),
    ])
    .style(Style::default().fg(Color::White))
    .block(Block::default().title(state.title).borders(Borders::ALL));

    frame.render_widget(body, area);
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
