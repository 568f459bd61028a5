//! Renderer-agnostic model of the printable invoice.
//!
//! `build_document` shapes the invoice state and company profile into blocks
//! the PDF layer can lay out without knowing anything about the domain. The
//! only hard precondition is a non-empty item collection.

use std::path::PathBuf;

use printpdf::image_crate::{self, GenericImageView};
use tracing::warn;

use crate::error::GenerationError;
use crate::invoice::InvoiceState;
use crate::models::{format_amount, CompanyProfile};

/// A logo that was verified to load as an image. Pixel dimensions are kept
/// so the renderer can scale to a fixed width preserving aspect ratio.
#[derive(Debug, Clone)]
pub struct LogoBlock {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub struct CompanyHeader {
    pub title: String,
    /// Labelled lines (Address, Phone, ...); a line whose source field is
    /// empty is not present at all.
    pub lines: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone)]
pub struct ItemsTable {
    pub header: [String; 4],
    pub rows: Vec<[String; 4]>,
    /// Subtotal, tax and total as label/value pairs, in that order.
    pub summary: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub logo: Option<LogoBlock>,
    pub company: CompanyHeader,
    /// Invoice #, Date, Customer.
    pub metadata: Vec<(&'static str, String)>,
    pub items: ItemsTable,
    pub terms: Vec<String>,
}

const TERMS: [&str; 2] = [
    "Payment is due within 30 days.",
    "Please make checks payable to the company name above.",
];

pub fn build_document(
    state: &InvoiceState,
    profile: &CompanyProfile,
) -> Result<DocumentModel, GenerationError> {
    if state.is_empty() {
        return Err(GenerationError::NoItems);
    }

    let currency = state.currency;
    let summary = state.compute_summary();

    let mut lines = Vec::new();
    if let Some(address) = profile.address_line() {
        lines.push(("Address", address));
    }
    for (label, value) in [
        ("Phone", &profile.phone),
        ("Email", &profile.email),
        ("Website", &profile.website),
        ("Tax ID", &profile.tax_id),
    ] {
        if !value.trim().is_empty() {
            lines.push((label, value.clone()));
        }
    }

    let rows = state
        .line_items()
        .iter()
        .map(|item| {
            [
                item.name.clone(),
                format_amount(item.quantity),
                format_amount(item.unit_price),
                format_amount(item.line_total()),
            ]
        })
        .collect();

    Ok(DocumentModel {
        logo: probe_logo(&profile.logo_path),
        company: CompanyHeader {
            title: profile.display_name().to_string(),
            lines,
        },
        metadata: vec![
            ("Invoice #", state.invoice_number.clone()),
            ("Date", state.invoice_date.format("%Y-%m-%d").to_string()),
            ("Customer", state.customer_name.clone()),
        ],
        items: ItemsTable {
            header: [
                "Item".to_string(),
                "Quantity".to_string(),
                format!("Unit Price ({currency})"),
                format!("Total ({currency})"),
            ],
            rows,
            summary: vec![
                ("Subtotal:".to_string(), format_amount(summary.subtotal)),
                (format!("{}:", state.tax_label()), format_amount(summary.tax_amount)),
                ("Total:".to_string(), format_amount(summary.total)),
            ],
        },
        terms: TERMS.iter().map(|t| t.to_string()).collect(),
    })
}

/// Best-effort logo check. The logo is cosmetic: any failure to open or
/// decode it is logged and the block is simply omitted.
fn probe_logo(logo_path: &str) -> Option<LogoBlock> {
    let logo_path = logo_path.trim();
    if logo_path.is_empty() {
        return None;
    }
    match image_crate::open(logo_path) {
        Ok(image) => {
            let (width_px, height_px) = image.dimensions();
            Some(LogoBlock {
                path: PathBuf::from(logo_path),
                width_px,
                height_px,
            })
        }
        Err(err) => {
            warn!(path = logo_path, %err, "skipping unloadable logo");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    fn sample_state() -> InvoiceState {
        let mut state = InvoiceState::new(Currency::Usd);
        state.invoice_number = "INV-001".to_string();
        state.customer_name = "Acme Corp".to_string();
        state.tax_rate_percent = 10.0;
        state.add_line_item("Widget", "2", "10.00").unwrap();
        state.add_line_item("Gadget", "1", "5.00").unwrap();
        state
    }

    #[test]
    fn empty_collection_is_the_only_hard_precondition() {
        let state = InvoiceState::new(Currency::Usd);
        let err = build_document(&state, &CompanyProfile::default()).unwrap_err();
        assert!(matches!(err, GenerationError::NoItems));
    }

    #[test]
    fn summary_rows_mirror_computed_totals() {
        let state = sample_state();
        let doc = build_document(&state, &CompanyProfile::default()).unwrap();

        assert_eq!(doc.items.rows.len(), 2);
        assert_eq!(doc.items.rows[0], ["Widget", "2.00", "10.00", "20.00"]);
        assert_eq!(
            doc.items.summary,
            vec![
                ("Subtotal:".to_string(), "25.00".to_string()),
                ("Tax (10%):".to_string(), "2.50".to_string()),
                ("Total:".to_string(), "27.50".to_string()),
            ]
        );
    }

    #[test]
    fn currency_appears_in_the_table_header() {
        let mut state = sample_state();
        state.currency = Currency::Eur;
        let doc = build_document(&state, &CompanyProfile::default()).unwrap();
        assert_eq!(doc.items.header[2], "Unit Price (EUR)");
        assert_eq!(doc.items.header[3], "Total (EUR)");
    }

    #[test]
    fn empty_profile_fields_are_omitted() {
        let state = sample_state();
        let mut profile = CompanyProfile::default();
        profile.phone = "555-0100".to_string();

        let doc = build_document(&state, &profile).unwrap();
        assert_eq!(doc.company.title, "Your Company");
        assert_eq!(doc.company.lines, vec![("Phone", "555-0100".to_string())]);
    }

    #[test]
    fn bad_logo_path_is_skipped_not_fatal() {
        let state = sample_state();
        let mut profile = CompanyProfile::default();
        profile.logo_path = "/no/such/logo.png".to_string();

        let doc = build_document(&state, &profile).unwrap();
        assert!(doc.logo.is_none());
    }

    #[test]
    fn metadata_carries_number_date_customer() {
        let state = sample_state();
        let doc = build_document(&state, &CompanyProfile::default()).unwrap();
        assert_eq!(doc.metadata[0], ("Invoice #", "INV-001".to_string()));
        assert_eq!(doc.metadata[2], ("Customer", "Acme Corp".to_string()));
    }
}
