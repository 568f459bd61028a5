//! The canonical invoice state and its derived views.
//!
//! All three presentations (the on-screen table, the printable document and
//! the tabular export) are projections of this one value; the summary is
//! recomputed from the line items on every read so the views can never
//! disagree.

use chrono::{Local, NaiveDate};

use crate::error::ValidationError;
use crate::models::{format_amount, Currency, LineItem, Summary};

/// One row of the on-screen items table. The price carries two decimals;
/// the currency is displayed as a label next to the table, not per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub index: u32,
    pub name: String,
    pub quantity: f64,
    pub price: String,
}

/// The single active invoice. There is exactly one per process and it is
/// only ever touched by the interactive thread.
#[derive(Debug, Clone)]
pub struct InvoiceState {
    line_items: Vec<LineItem>,
    pub tax_rate_percent: f64,
    pub currency: Currency,
    pub customer_name: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
}

impl InvoiceState {
    pub fn new(currency: Currency) -> Self {
        Self {
            line_items: Vec::new(),
            tax_rate_percent: 0.0,
            currency,
            customer_name: String::new(),
            invoice_number: String::new(),
            invoice_date: Local::now().date_naive(),
        }
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Validate and append a new line item. All three fields must be
    /// present and quantity/price must parse; on any rejection the
    /// collection is left exactly as it was.
    pub fn add_line_item(
        &mut self,
        name: &str,
        quantity_text: &str,
        price_text: &str,
    ) -> Result<&LineItem, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Item"));
        }
        if quantity_text.trim().is_empty() {
            return Err(ValidationError::MissingField("Quantity"));
        }
        if price_text.trim().is_empty() {
            return Err(ValidationError::MissingField("Price"));
        }

        let quantity: f64 = quantity_text
            .trim()
            .parse()
            .map_err(|_| ValidationError::NotANumber("Quantity"))?;
        let unit_price: f64 = price_text
            .trim()
            .parse()
            .map_err(|_| ValidationError::NotANumber("Price"))?;

        self.line_items.push(LineItem {
            index: self.line_items.len() as u32 + 1,
            name: name.to_string(),
            quantity,
            unit_price,
        });
        Ok(self.line_items.last().expect("just pushed"))
    }

    /// Pop the most recently added item. A no-op on an empty collection;
    /// surviving indices are untouched (the collection is append/pop-only,
    /// so they stay dense).
    pub fn remove_last_line_item(&mut self) -> Option<LineItem> {
        self.line_items.pop()
    }

    pub fn clear_all(&mut self) {
        self.line_items.clear();
    }

    /// Derive subtotal/tax/total from the current items. Pure and cheap;
    /// callers invoke it before every render and again right before
    /// generation or export.
    pub fn compute_summary(&self) -> Summary {
        let subtotal: f64 = self.line_items.iter().map(LineItem::line_total).sum();
        let tax_amount = subtotal * (self.tax_rate_percent / 100.0);
        Summary {
            subtotal,
            tax_amount,
            total: subtotal + tax_amount,
        }
    }

    pub fn build_display_rows(&self) -> Vec<DisplayRow> {
        self.line_items
            .iter()
            .map(|item| DisplayRow {
                index: item.index,
                name: item.name.clone(),
                quantity: item.quantity,
                price: format_amount(item.unit_price),
            })
            .collect()
    }

    /// Label for the summary rows shared by the print document and the
    /// export footer, e.g. "Tax (10%)". Plain numeric formatting, no
    /// forced decimals.
    pub fn tax_label(&self) -> String {
        format!("Tax ({}%)", self.tax_rate_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_items(items: &[(&str, &str, &str)]) -> InvoiceState {
        let mut state = InvoiceState::new(Currency::Usd);
        for (name, quantity, price) in items {
            state.add_line_item(name, quantity, price).unwrap();
        }
        state
    }

    #[test]
    fn widget_gadget_scenario() {
        let mut state = state_with_items(&[("Widget", "2", "10.00"), ("Gadget", "1", "5.00")]);
        state.tax_rate_percent = 10.0;

        let summary = state.compute_summary();
        assert_eq!(format_amount(summary.subtotal), "25.00");
        assert_eq!(format_amount(summary.tax_amount), "2.50");
        assert_eq!(format_amount(summary.total), "27.50");
    }

    #[test]
    fn subtotal_tracks_adds_and_removals() {
        let mut state = state_with_items(&[("A", "1", "1.50"), ("B", "3", "2.00"), ("C", "2", "0.25")]);
        assert_eq!(format_amount(state.compute_summary().subtotal), "8.00");

        state.remove_last_line_item();
        assert_eq!(format_amount(state.compute_summary().subtotal), "7.50");

        state.clear_all();
        assert_eq!(state.compute_summary().subtotal, 0.0);
        assert_eq!(state.compute_summary().total, 0.0);
    }

    #[test]
    fn remove_on_empty_is_a_noop() {
        let mut state = InvoiceState::new(Currency::Usd);
        assert!(state.remove_last_line_item().is_none());

        state.add_line_item("Widget", "1", "1").unwrap();
        assert!(state.remove_last_line_item().is_some());
        assert!(state.remove_last_line_item().is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn invalid_input_mutates_nothing() {
        let mut state = state_with_items(&[("Widget", "2", "10.00")]);

        assert_eq!(
            state.add_line_item("", "1", "1"),
            Err(ValidationError::MissingField("Item"))
        );
        assert_eq!(
            state.add_line_item("Gadget", "  ", "1"),
            Err(ValidationError::MissingField("Quantity"))
        );
        assert_eq!(
            state.add_line_item("Gadget", "1", ""),
            Err(ValidationError::MissingField("Price"))
        );
        assert_eq!(
            state.add_line_item("Gadget", "two", "1"),
            Err(ValidationError::NotANumber("Quantity"))
        );
        assert_eq!(
            state.add_line_item("Gadget", "1", "$5"),
            Err(ValidationError::NotANumber("Price"))
        );

        assert_eq!(state.line_items().len(), 1);
        assert_eq!(format_amount(state.compute_summary().subtotal), "20.00");
    }

    #[test]
    fn indices_are_assigned_at_insertion() {
        let mut state = state_with_items(&[("A", "1", "1"), ("B", "1", "1")]);
        state.remove_last_line_item();
        state.add_line_item("C", "1", "1").unwrap();

        let rows = state.build_display_rows();
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[1].name, "C");
    }

    #[test]
    fn display_rows_format_price_to_two_decimals() {
        let state = state_with_items(&[("Widget", "2.5", "9.5")]);
        let rows = state.build_display_rows();
        assert_eq!(rows[0].price, "9.50");
        assert_eq!(rows[0].quantity, 2.5);
    }

    #[test]
    fn tax_label_uses_plain_formatting() {
        let mut state = InvoiceState::new(Currency::Usd);
        state.tax_rate_percent = 10.0;
        assert_eq!(state.tax_label(), "Tax (10%)");
        state.tax_rate_percent = 7.5;
        assert_eq!(state.tax_label(), "Tax (7.5%)");
    }
}
