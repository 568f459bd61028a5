use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::CompanyProfile;
use crate::ui::{render_notice, Notice};

pub enum SettingsAction {
    Back,
    Save(CompanyProfile),
}

#[derive(Clone, Copy, PartialEq)]
pub enum SettingsField {
    CompanyName,
    Address,
    City,
    Country,
    Phone,
    Email,
    Website,
    TaxId,
    Currency,
    LogoPath,
}

/// The settings form edits a working copy; Esc discards it, S hands the
/// copy back to the caller for persisting.
pub struct SettingsScreenState {
    pub profile: CompanyProfile,
    pub current_field: SettingsField,
    pub editing: bool,
    pub notice: Option<Notice>,
}

impl SettingsScreenState {
    pub fn new(profile: CompanyProfile) -> Self {
        Self {
            profile,
            current_field: SettingsField::CompanyName,
            editing: false,
            notice: None,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            SettingsField::CompanyName => SettingsField::Address,
            SettingsField::Address => SettingsField::City,
            SettingsField::City => SettingsField::Country,
            SettingsField::Country => SettingsField::Phone,
            SettingsField::Phone => SettingsField::Email,
            SettingsField::Email => SettingsField::Website,
            SettingsField::Website => SettingsField::TaxId,
            SettingsField::TaxId => SettingsField::Currency,
            SettingsField::Currency => SettingsField::LogoPath,
            SettingsField::LogoPath => SettingsField::CompanyName,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            SettingsField::CompanyName => SettingsField::LogoPath,
            SettingsField::Address => SettingsField::CompanyName,
            SettingsField::City => SettingsField::Address,
            SettingsField::Country => SettingsField::City,
            SettingsField::Phone => SettingsField::Country,
            SettingsField::Email => SettingsField::Phone,
            SettingsField::Website => SettingsField::Email,
            SettingsField::TaxId => SettingsField::Website,
            SettingsField::Currency => SettingsField::TaxId,
            SettingsField::LogoPath => SettingsField::Currency,
        };
    }

    pub fn toggle_editing(&mut self) {
        // The currency is cycled with Left/Right, never free-typed.
        if self.current_field == SettingsField::Currency {
            return;
        }
        self.editing = !self.editing;
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            SettingsField::CompanyName => &mut self.profile.company_name,
            SettingsField::Address => &mut self.profile.address,
            SettingsField::City => &mut self.profile.city,
            SettingsField::Country => &mut self.profile.country,
            SettingsField::Phone => &mut self.profile.phone,
            SettingsField::Email => &mut self.profile.email,
            SettingsField::Website => &mut self.profile.website,
            SettingsField::TaxId => &mut self.profile.tax_id,
            SettingsField::LogoPath => &mut self.profile.logo_path,
            SettingsField::Currency => return,
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }
}

pub fn handle_input(state: &mut SettingsScreenState) -> Result<Option<SettingsAction>> {
    if let Event::Key(key) = event::read()? {
        if state.notice.is_some() {
            state.notice = None;
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(SettingsAction::Back));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Right
                if !state.editing && state.current_field == SettingsField::Currency =>
            {
                state.profile.currency = state.profile.currency.next();
            }
            KeyCode::Left
                if !state.editing && state.current_field == SettingsField::Currency =>
            {
                state.profile.currency = state.profile.currency.previous();
            }
            KeyCode::Char('s') if !state.editing => {
                return Ok(Some(SettingsAction::Save(state.profile.clone())));
            }
            KeyCode::Char('r') if !state.editing => {
                state.profile = CompanyProfile::default();
                state.notice = Some(Notice::info("Settings reset to defaults (not yet saved)"));
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

pub fn render_settings_screen<B: Backend>(f: &mut Frame<B>, state: &mut SettingsScreenState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Company Settings")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | Left/Right - Cycle currency | \
         S - Save | R - Reset defaults | Esc - Back"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if let Some(notice) = &state.notice {
        render_notice(f, notice);
    }
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut SettingsScreenState, area: Rect) {
    let currency_display = format!("< {} >", state.profile.currency.code());
    let fields: [(&str, &str); 10] = [
        ("Company Name", &state.profile.company_name),
        ("Address", &state.profile.address),
        ("City", &state.profile.city),
        ("Country", &state.profile.country),
        ("Phone", &state.profile.phone),
        ("Email", &state.profile.email),
        ("Website", &state.profile.website),
        ("Tax ID", &state.profile.tax_id),
        ("Currency", &currency_display),
        ("Logo Path", &state.profile.logo_path),
    ];

    let items: Vec<ListItem> = fields
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let selected = i == state.current_field as usize;
            let content = if selected && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{value}|"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.to_string()),
                ])
            };
            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Company Details"));
    f.render_widget(form_list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn currency_cycles_in_both_directions() {
        let mut state = SettingsScreenState::new(CompanyProfile::default());
        state.current_field = SettingsField::Currency;

        state.profile.currency = state.profile.currency.next();
        assert_ne!(state.profile.currency, Currency::Usd);

        state.profile.currency = state.profile.currency.previous();
        assert_eq!(state.profile.currency, Currency::Usd);
    }

    #[test]
    fn currency_field_never_enters_text_editing() {
        let mut state = SettingsScreenState::new(CompanyProfile::default());
        state.current_field = SettingsField::Currency;
        state.toggle_editing();
        assert!(!state.editing);
    }

    #[test]
    fn reset_restores_defaults_without_saving() {
        let mut profile = CompanyProfile::default();
        profile.company_name = "Acme".to_string();
        profile.currency = Currency::Egp;

        let mut state = SettingsScreenState::new(profile);
        state.profile = CompanyProfile::default();
        assert_eq!(state.profile.currency, Currency::Usd);
        assert_eq!(state.profile.company_name, "");
    }

    #[test]
    fn typing_appends_to_the_selected_field() {
        let mut state = SettingsScreenState::new(CompanyProfile::default());
        state.current_field = SettingsField::City;
        state.toggle_editing();
        state.edit_current_field(KeyCode::Char('C'));
        state.edit_current_field(KeyCode::Char('a'));
        assert_eq!(state.profile.city, "Ca");
    }
}
