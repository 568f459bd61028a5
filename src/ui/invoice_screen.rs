use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::error::{ExportError, GenerationError};
use crate::invoice::InvoiceState;
use crate::models::format_amount;
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::path_prompt::{
    render_path_prompt, PathPromptAction, PathPromptState,
};
use crate::ui::{render_notice, Notice};

pub enum InvoiceScreenAction {
    Quit,
    OpenSettings,
    OpenEmailWizard,
    GeneratePdf(PathBuf),
    Export(PathBuf),
}

#[derive(Clone, Copy, PartialEq)]
pub enum InvoiceField {
    Customer,
    InvoiceNumber,
    Date,
    TaxRate,
    ItemName,
    ItemQuantity,
    ItemPrice,
}

enum PromptTarget {
    Pdf,
    Export,
}

pub struct InvoiceScreenState {
    pub current_field: InvoiceField,
    pub editing: bool,
    pub notice: Option<Notice>,
    tax_input: String,
    item_name: String,
    item_quantity: String,
    item_price: String,
    date_input: DateInputState,
    prompt: Option<(PromptTarget, PathPromptState)>,
}

impl InvoiceScreenState {
    pub fn new(invoice: &InvoiceState) -> Self {
        Self {
            current_field: InvoiceField::Customer,
            editing: false,
            notice: None,
            tax_input: plain_number(invoice.tax_rate_percent),
            item_name: String::new(),
            item_quantity: String::new(),
            item_price: String::new(),
            date_input: DateInputState::new(invoice.invoice_date),
            prompt: None,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            InvoiceField::Customer => InvoiceField::InvoiceNumber,
            InvoiceField::InvoiceNumber => InvoiceField::Date,
            InvoiceField::Date => InvoiceField::TaxRate,
            InvoiceField::TaxRate => InvoiceField::ItemName,
            InvoiceField::ItemName => InvoiceField::ItemQuantity,
            InvoiceField::ItemQuantity => InvoiceField::ItemPrice,
            InvoiceField::ItemPrice => InvoiceField::Customer,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            InvoiceField::Customer => InvoiceField::ItemPrice,
            InvoiceField::InvoiceNumber => InvoiceField::Customer,
            InvoiceField::Date => InvoiceField::InvoiceNumber,
            InvoiceField::TaxRate => InvoiceField::Date,
            InvoiceField::ItemName => InvoiceField::TaxRate,
            InvoiceField::ItemQuantity => InvoiceField::ItemName,
            InvoiceField::ItemPrice => InvoiceField::ItemQuantity,
        };
    }

    fn start_editing(&mut self, invoice: &InvoiceState) {
        self.editing = true;
        if self.current_field == InvoiceField::Date {
            self.date_input.date = invoice.invoice_date;
            if !self.date_input.editing {
                self.date_input.toggle_editing();
            }
        }
    }

    fn stop_editing(&mut self) {
        self.editing = false;
        if self.date_input.editing {
            self.date_input.toggle_editing();
        }
    }

    /// Commit the field being edited. The tax rate is the only field that
    /// can refuse: it must parse as a non-negative number.
    fn commit_current_field(&mut self, invoice: &mut InvoiceState) {
        match self.current_field {
            InvoiceField::TaxRate => {
                let text = self.tax_input.trim();
                let parsed = if text.is_empty() {
                    Ok(0.0)
                } else {
                    text.parse::<f64>().map_err(|_| ())
                };
                match parsed {
                    Ok(rate) if rate >= 0.0 => {
                        invoice.tax_rate_percent = rate;
                        self.tax_input = plain_number(rate);
                        self.stop_editing();
                    }
                    _ => {
                        self.notice =
                            Some(Notice::error("Tax rate must be a non-negative number"));
                    }
                }
            }
            InvoiceField::Date => {
                invoice.invoice_date = self.date_input.date;
                self.stop_editing();
            }
            InvoiceField::ItemName | InvoiceField::ItemQuantity => {
                self.next_field();
            }
            InvoiceField::ItemPrice => {
                self.try_add_item(invoice);
            }
            _ => self.stop_editing(),
        }
    }

    fn try_add_item(&mut self, invoice: &mut InvoiceState) {
        match invoice.add_line_item(&self.item_name, &self.item_quantity, &self.item_price) {
            Ok(_) => {
                self.item_name.clear();
                self.item_quantity.clear();
                self.item_price.clear();
                self.current_field = InvoiceField::ItemName;
            }
            Err(err) => {
                self.notice = Some(Notice::error(err.to_string()));
            }
        }
    }

    fn edit_current_field(&mut self, key: KeyCode, invoice: &mut InvoiceState) {
        if self.current_field == InvoiceField::Date {
            self.date_input.handle_input(key);
            return;
        }

        let field_value = match self.current_field {
            InvoiceField::Customer => &mut invoice.customer_name,
            InvoiceField::InvoiceNumber => &mut invoice.invoice_number,
            InvoiceField::TaxRate => &mut self.tax_input,
            InvoiceField::ItemName => &mut self.item_name,
            InvoiceField::ItemQuantity => &mut self.item_quantity,
            InvoiceField::ItemPrice => &mut self.item_price,
            InvoiceField::Date => unreachable!(),
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

/// Filename offered in the save prompt, derived from the invoice number.
pub fn suggested_filename(invoice_number: &str, extension: &str) -> String {
    let stem = invoice_number.trim().replace(' ', "_");
    if stem.is_empty() {
        format!("invoice.{extension}")
    } else {
        format!("invoice_{stem}.{extension}")
    }
}

fn plain_number(value: f64) -> String {
    // No forced decimals: 10.0 renders as "10", 7.5 as "7.5".
    format!("{value}")
}

pub fn handle_input(
    state: &mut InvoiceScreenState,
    invoice: &mut InvoiceState,
) -> Result<Option<InvoiceScreenAction>> {
    if let Event::Key(key) = event::read()? {
        // Popups swallow the event before the form sees it.
        if state.notice.is_some() {
            state.notice = None;
            return Ok(None);
        }
        if let Some((target, prompt)) = state.prompt.as_mut() {
            if let Some(action) = prompt.handle_key(key.code) {
                let target_is_pdf = matches!(target, PromptTarget::Pdf);
                state.prompt = None;
                if let PathPromptAction::Confirm(path) = action {
                    return Ok(Some(if target_is_pdf {
                        InvoiceScreenAction::GeneratePdf(path)
                    } else {
                        InvoiceScreenAction::Export(path)
                    }));
                }
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.stop_editing();
                } else {
                    return Ok(Some(InvoiceScreenAction::Quit));
                }
            }
            KeyCode::Enter => {
                if state.editing {
                    state.commit_current_field(invoice);
                } else {
                    state.start_editing(invoice);
                }
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('q') if !state.editing => {
                return Ok(Some(InvoiceScreenAction::Quit));
            }
            KeyCode::Char('a') if !state.editing => {
                state.try_add_item(invoice);
            }
            KeyCode::Char('r') if !state.editing => {
                // Always removes the newest item; a no-op when empty.
                invoice.remove_last_line_item();
            }
            KeyCode::Char('c') if !state.editing => {
                invoice.clear_all();
            }
            KeyCode::Char('g') if !state.editing => {
                if invoice.is_empty() {
                    state.notice = Some(Notice::error(GenerationError::NoItems.to_string()));
                } else {
                    state.prompt = Some((
                        PromptTarget::Pdf,
                        PathPromptState::new(
                            "Save PDF As",
                            suggested_filename(&invoice.invoice_number, "pdf"),
                        ),
                    ));
                }
            }
            KeyCode::Char('x') if !state.editing => {
                if invoice.is_empty() {
                    state.notice = Some(Notice::error(ExportError::NoItems.to_string()));
                } else {
                    state.prompt = Some((
                        PromptTarget::Export,
                        PathPromptState::new(
                            "Export As (.csv or .xlsx)",
                            suggested_filename(&invoice.invoice_number, "xlsx"),
                        ),
                    ));
                }
            }
            KeyCode::Char('m') if !state.editing => {
                if invoice.is_empty() {
                    state.notice = Some(Notice::error(GenerationError::NoItems.to_string()));
                } else {
                    return Ok(Some(InvoiceScreenAction::OpenEmailWizard));
                }
            }
            KeyCode::Char('s') if !state.editing => {
                return Ok(Some(InvoiceScreenAction::OpenSettings));
            }
            _ if state.editing => {
                state.edit_current_field(key.code, invoice);
            }
            _ => {}
        }
    }

    Ok(None)
}

pub fn render_invoice_screen<B: Backend>(
    f: &mut Frame<B>,
    state: &mut InvoiceScreenState,
    invoice: &InvoiceState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(6),
                Constraint::Length(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Invoice Entry")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let form_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);

    render_details_form(f, state, invoice, form_columns[0]);
    render_item_form(f, state, invoice, form_columns[1]);
    render_items_table(f, invoice, chunks[2]);
    render_summary(f, invoice, chunks[3]);

    let help_text = if state.prompt.is_some() {
        "Type a destination path | Enter - Confirm | Esc - Cancel"
    } else if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit | Up/Down - Navigate | A - Add item | R - Remove last | C - Clear | \
         G - PDF | X - Export | M - Email | S - Settings | Q - Quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[4]);

    if let Some((_, prompt)) = &state.prompt {
        render_path_prompt(f, prompt);
    }
    if let Some(notice) = &state.notice {
        render_notice(f, notice);
    }
}

fn field_item(name: &str, value: String, selected: bool, editing: bool) -> ListItem<'static> {
    let content = if selected && editing {
        Spans::from(vec![
            Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
        ])
    } else {
        let style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Spans::from(vec![
            Span::styled(format!("{}: ", name), style),
            Span::raw(value),
        ])
    };
    ListItem::new(content)
}

fn render_details_form<B: Backend>(
    f: &mut Frame<B>,
    state: &InvoiceScreenState,
    invoice: &InvoiceState,
    area: Rect,
) {
    let cursor = |field: InvoiceField, value: &str| {
        if state.editing && state.current_field == field {
            format!("{value}|")
        } else {
            value.to_string()
        }
    };

    let date_text = if state.editing && state.current_field == InvoiceField::Date {
        state.date_input.display_string()
    } else {
        invoice.invoice_date.format("%Y-%m-%d").to_string()
    };

    let fields = [
        (InvoiceField::Customer, "Customer", cursor(InvoiceField::Customer, &invoice.customer_name)),
        (
            InvoiceField::InvoiceNumber,
            "Invoice #",
            cursor(InvoiceField::InvoiceNumber, &invoice.invoice_number),
        ),
        (InvoiceField::Date, "Date", date_text),
        (InvoiceField::TaxRate, "Tax Rate (%)", cursor(InvoiceField::TaxRate, &state.tax_input)),
    ];

    let items: Vec<ListItem> = fields
        .into_iter()
        .map(|(field, name, value)| {
            field_item(name, value, state.current_field == field, state.editing)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Invoice Details"));
    f.render_widget(list, area);
}

fn render_item_form<B: Backend>(
    f: &mut Frame<B>,
    state: &InvoiceScreenState,
    invoice: &InvoiceState,
    area: Rect,
) {
    let cursor = |field: InvoiceField, value: &str| {
        if state.editing && state.current_field == field {
            format!("{value}|")
        } else {
            value.to_string()
        }
    };

    let price_label = format!("Unit Price ({})", invoice.currency.code());
    let fields = [
        (InvoiceField::ItemName, "Item".to_string(), cursor(InvoiceField::ItemName, &state.item_name)),
        (
            InvoiceField::ItemQuantity,
            "Quantity".to_string(),
            cursor(InvoiceField::ItemQuantity, &state.item_quantity),
        ),
        (
            InvoiceField::ItemPrice,
            price_label,
            cursor(InvoiceField::ItemPrice, &state.item_price),
        ),
    ];

    let items: Vec<ListItem> = fields
        .into_iter()
        .map(|(field, name, value)| {
            field_item(&name, value, state.current_field == field, state.editing)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Add Item"));
    f.render_widget(list, area);
}

fn render_items_table<B: Backend>(f: &mut Frame<B>, invoice: &InvoiceState, area: Rect) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Item"),
        Cell::from("Quantity"),
        Cell::from(format!("Unit Price ({})", invoice.currency.code())),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = invoice
        .build_display_rows()
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.index.to_string()),
                Cell::from(row.name),
                Cell::from(format!("{}", row.quantity)),
                Cell::from(row.price),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(50),
        Constraint::Length(10),
        Constraint::Length(18),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Items"))
        .widths(&widths);
    f.render_widget(table, area);
}

fn render_summary<B: Backend>(f: &mut Frame<B>, invoice: &InvoiceState, area: Rect) {
    let summary = invoice.compute_summary();
    let currency = invoice.currency.code();

    let lines = vec![
        Spans::from(format!("Subtotal: {} {}", currency, format_amount(summary.subtotal))),
        Spans::from(format!(
            "{}: {} {}",
            invoice.tax_label(),
            currency,
            format_amount(summary.tax_amount)
        )),
        Spans::from(vec![Span::styled(
            format!("Total: {} {}", currency, format_amount(summary.total)),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
    ];

    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Summary"));
    f.render_widget(block, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn suggested_filenames_track_the_invoice_number() {
        assert_eq!(suggested_filename("INV-001", "pdf"), "invoice_INV-001.pdf");
        assert_eq!(suggested_filename("no 42", "xlsx"), "invoice_no_42.xlsx");
        assert_eq!(suggested_filename("  ", "pdf"), "invoice.pdf");
    }

    #[test]
    fn tax_commit_rejects_bad_input() {
        let mut invoice = InvoiceState::new(Currency::Usd);
        let mut state = InvoiceScreenState::new(&invoice);
        state.current_field = InvoiceField::TaxRate;
        state.editing = true;

        state.tax_input = "ten".to_string();
        state.commit_current_field(&mut invoice);
        assert!(state.notice.is_some());
        assert!(state.editing);
        assert_eq!(invoice.tax_rate_percent, 0.0);

        state.notice = None;
        state.tax_input = "-3".to_string();
        state.commit_current_field(&mut invoice);
        assert!(state.notice.is_some());
        assert_eq!(invoice.tax_rate_percent, 0.0);
    }

    #[test]
    fn tax_commit_accepts_numbers_and_empty() {
        let mut invoice = InvoiceState::new(Currency::Usd);
        let mut state = InvoiceScreenState::new(&invoice);
        state.current_field = InvoiceField::TaxRate;
        state.editing = true;

        state.tax_input = "7.5".to_string();
        state.commit_current_field(&mut invoice);
        assert_eq!(invoice.tax_rate_percent, 7.5);
        assert!(!state.editing);

        state.editing = true;
        state.tax_input = "  ".to_string();
        state.commit_current_field(&mut invoice);
        assert_eq!(invoice.tax_rate_percent, 0.0);
    }

    #[test]
    fn adding_from_buffers_clears_them() {
        let mut invoice = InvoiceState::new(Currency::Usd);
        let mut state = InvoiceScreenState::new(&invoice);
        state.item_name = "Widget".to_string();
        state.item_quantity = "2".to_string();
        state.item_price = "10".to_string();

        state.try_add_item(&mut invoice);
        assert_eq!(invoice.line_items().len(), 1);
        assert!(state.item_name.is_empty());
        assert!(state.item_price.is_empty());
        assert!(state.notice.is_none());
    }

    #[test]
    fn failed_add_keeps_buffers_and_raises_notice() {
        let mut invoice = InvoiceState::new(Currency::Usd);
        let mut state = InvoiceScreenState::new(&invoice);
        state.item_name = "Widget".to_string();
        state.item_quantity = "two".to_string();
        state.item_price = "10".to_string();

        state.try_add_item(&mut invoice);
        assert!(invoice.is_empty());
        assert_eq!(state.item_quantity, "two");
        assert!(state.notice.is_some());
    }
}
