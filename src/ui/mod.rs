pub mod components;
pub mod email_wizard;
pub mod invoice_screen;
pub mod settings_screen;

use tui::{
    backend::Backend,
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use components::path_prompt::centered_rect;

/// A one-shot popup message; any key dismisses it.
pub struct Notice {
    pub text: String,
    pub error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: true,
        }
    }
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, notice: &Notice) {
    let area = centered_rect(60, 20, frame.size());
    frame.render_widget(Clear, area);

    let (title, color) = if notice.error {
        ("Error", Color::Red)
    } else {
        ("Success", Color::Green)
    };

    let body = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(notice.text.as_str()),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title(title).borders(Borders::ALL))
    .style(Style::default().fg(color));

    frame.render_widget(body, area);
}
