use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tracing::{info, warn};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::email::EmailRequest;
use crate::ui::{render_notice, Notice};

#[derive(Clone, Copy, PartialEq)]
pub enum EmailField {
    Recipient,
    Sender,
    Password,
    Subject,
    Message,
    None,
}

pub enum EmailWizardAction {
    Cancel,
    Send,
}

/// The email form. The attachment is a freshly generated PDF in the temp
/// directory; the wizard owns that file and removes it when it goes away.
pub struct EmailWizardState {
    pub invoice_number: String,
    pub recipient: String,
    pub sender: String,
    pub password: String,
    pub subject: String,
    pub message: String,
    pub current_field: EmailField,
    pub show_error: Option<String>,
    pub show_success: Option<String>,
    attachment_path: PathBuf,
}

impl EmailWizardState {
    pub fn new(invoice_number: String, attachment_path: PathBuf) -> Self {
        Self {
            invoice_number,
            recipient: String::new(),
            sender: String::new(),
            password: String::new(),
            subject: String::new(),
            message: String::new(),
            current_field: EmailField::Recipient,
            show_error: None,
            show_success: None,
            attachment_path,
        }
    }

    pub fn attachment_path(&self) -> &PathBuf {
        &self.attachment_path
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            EmailField::Recipient => EmailField::Sender,
            EmailField::Sender => EmailField::Password,
            EmailField::Password => EmailField::Subject,
            EmailField::Subject => EmailField::Message,
            EmailField::Message => EmailField::None,
            EmailField::None => EmailField::None,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            EmailField::Recipient => EmailField::Recipient,
            EmailField::Sender => EmailField::Recipient,
            EmailField::Password => EmailField::Sender,
            EmailField::Subject => EmailField::Password,
            EmailField::Message => EmailField::Subject,
            EmailField::None => EmailField::Message,
        };
    }

    pub fn handle_char(&mut self, input: char) {
        let field_value = match self.current_field {
            EmailField::Recipient => &mut self.recipient,
            EmailField::Sender => &mut self.sender,
            EmailField::Password => &mut self.password,
            EmailField::Subject => &mut self.subject,
            EmailField::Message => &mut self.message,
            EmailField::None => return,
        };
        if input == '\u{7f}' {
            field_value.pop();
        } else {
            field_value.push(input);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.recipient.is_empty() || !self.recipient.contains('@') {
            return Err("Recipient must be a valid email address".into());
        }
        if self.sender.is_empty() || !self.sender.contains('@') {
            return Err("Sender must be a valid email address".into());
        }
        if self.password.is_empty() {
            return Err("Password cannot be empty".into());
        }
        if self.subject.is_empty() {
            return Err("Subject cannot be empty".into());
        }
        Ok(())
    }

    pub fn to_request(&self) -> EmailRequest {
        EmailRequest {
            recipient: self.recipient.clone(),
            sender: self.sender.clone(),
            password: self.password.clone(),
            subject: self.subject.clone(),
            body: self.message.clone(),
            attachment: self.attachment_path.clone(),
        }
    }

    pub fn has_success_message(&self) -> bool {
        self.show_success.is_some()
    }

    fn cleanup_files(&self) {
        if self.attachment_path.exists() {
            match fs::remove_file(&self.attachment_path) {
                Ok(()) => info!(path = %self.attachment_path.display(), "removed temporary attachment"),
                Err(err) => warn!(%err, "could not remove temporary attachment"),
            }
        }
    }
}

// The temp attachment must not outlive the wizard, whatever path closes it.
impl Drop for EmailWizardState {
    fn drop(&mut self) {
        self.cleanup_files();
    }
}

pub fn handle_input(state: &mut EmailWizardState) -> Result<Option<EmailWizardAction>> {
    if let Event::Key(key) = event::read()? {
        if state.show_success.is_some() {
            // Acknowledged; the send is done and the wizard closes.
            return Ok(Some(EmailWizardAction::Cancel));
        }
        if state.show_error.is_some() {
            state.show_error = None;
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => {
                return Ok(Some(EmailWizardAction::Cancel));
            }
            KeyCode::Backspace => {
                state.handle_char('\u{7f}');
            }
            KeyCode::Char(c) => {
                state.handle_char(c);
            }
            KeyCode::Enter => {
                if state.current_field == EmailField::None {
                    match state.validate() {
                        Ok(()) => return Ok(Some(EmailWizardAction::Send)),
                        Err(e) => state.show_error = Some(e),
                    }
                } else if state.current_field == EmailField::Message {
                    state.handle_char('\n');
                } else {
                    state.next_field();
                }
            }
            KeyCode::Tab => {
                if key.modifiers.contains(crossterm::event::KeyModifiers::SHIFT) {
                    state.previous_field();
                } else {
                    state.next_field();
                }
            }
            _ => {}
        }
    }

    Ok(None)
}

pub fn render_email_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut EmailWizardState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    let title = Paragraph::new(format!("Email Invoice {}", state.invoice_number))
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let field_style = |field: EmailField| {
        if state.current_field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let recipient = Paragraph::new(state.recipient.clone())
        .style(field_style(EmailField::Recipient))
        .block(Block::default().borders(Borders::ALL).title("Recipient"));
    frame.render_widget(recipient, chunks[1]);

    let sender = Paragraph::new(state.sender.clone())
        .style(field_style(EmailField::Sender))
        .block(Block::default().borders(Borders::ALL).title("Sender (SMTP login)"));
    frame.render_widget(sender, chunks[2]);

    let masked = "*".repeat(state.password.chars().count());
    let password = Paragraph::new(masked)
        .style(field_style(EmailField::Password))
        .block(Block::default().borders(Borders::ALL).title("App Password"));
    frame.render_widget(password, chunks[3]);

    let subject = Paragraph::new(state.subject.clone())
        .style(field_style(EmailField::Subject))
        .block(Block::default().borders(Borders::ALL).title("Subject"));
    frame.render_widget(subject, chunks[4]);

    let message = Paragraph::new(state.message.clone())
        .style(field_style(EmailField::Message))
        .block(Block::default().borders(Borders::ALL).title("Message"));
    frame.render_widget(message, chunks[5]);

    let buttons_text = match state.current_field {
        EmailField::None => "<Enter> Send | <Tab> Back to Fields | <Esc> Cancel",
        _ => "<Tab> Next Field | <Shift+Tab> Previous Field | <Esc> Cancel",
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[6]);

    if let Some(error) = &state.show_error {
        render_notice(frame, &Notice::error(error.clone()));
    }
    if let Some(success) = &state.show_success {
        render_notice(frame, &Notice::info(success.clone()));
    }
}
