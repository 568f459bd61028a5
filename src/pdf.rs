//! Lays a `DocumentModel` out on letter-size pages and writes the PDF.
//!
//! Plain cursor-driven layout with the builtin Helvetica faces; the model
//! decides content, this module only decides where ink goes.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use printpdf::{
    image_crate, BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use tracing::warn;

use crate::document::{DocumentModel, LogoBlock};
use crate::error::GenerationError;

const PAGE_WIDTH: f32 = 215.9; // US letter
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 200.0;
const TOP_Y: f32 = 260.0;
const BOTTOM_Y: f32 = 25.0;

const LOGO_WIDTH_MM: f32 = 38.1; // 1.5 inch, fixed maximum width
const LOGO_DPI: f32 = 300.0;

// Items table column x positions.
const X_ITEM: f32 = MARGIN_LEFT;
const X_QTY: f32 = 105.0;
const X_UNIT: f32 = 135.0;
const X_TOTAL: f32 = 172.0;

struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor<'_> {
    fn advance(&mut self, step: f32) {
        self.y -= step;
        if self.y < BOTTOM_Y {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
    }

    fn text(&self, font: &IndirectFontRef, size: f32, x: f32, content: &str) {
        self.layer.use_text(content, size, Mm(x), Mm(self.y), font);
    }

    fn rule(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(self.y)), false),
                (Point::new(Mm(MARGIN_RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }
}

/// Render the document to `path`, creating parent directories as needed.
/// Nothing is written when the destination cannot be created.
pub fn render_to_file(document: &DocumentModel, path: &Path) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let (doc, page, layer) = PdfDocument::new("Invoice", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(to_io)?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(to_io)?;

    let mut cursor = PageCursor {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        y: TOP_Y,
    };

    if let Some(logo) = &document.logo {
        draw_logo(&mut cursor, logo);
    }

    // Company header.
    cursor.text(&font_bold, 18.0, MARGIN_LEFT, &document.company.title);
    cursor.advance(8.0);
    for (label, value) in &document.company.lines {
        cursor.text(&font_bold, 10.0, MARGIN_LEFT, &format!("{label}:"));
        cursor.text(&font, 10.0, MARGIN_LEFT + 25.0, value);
        cursor.advance(5.0);
    }
    cursor.advance(6.0);

    cursor.text(&font_bold, 14.0, MARGIN_LEFT, "INVOICE");
    cursor.advance(8.0);

    for (label, value) in &document.metadata {
        cursor.text(&font_bold, 10.0, MARGIN_LEFT, &format!("{label}:"));
        cursor.text(&font, 10.0, MARGIN_LEFT + 30.0, value);
        cursor.advance(5.0);
    }
    cursor.advance(6.0);

    // Items table.
    let header = &document.items.header;
    cursor.text(&font_bold, 10.0, X_ITEM, &header[0]);
    cursor.text(&font_bold, 10.0, X_QTY, &header[1]);
    cursor.text(&font_bold, 10.0, X_UNIT, &header[2]);
    cursor.text(&font_bold, 10.0, X_TOTAL, &header[3]);
    cursor.advance(2.5);
    cursor.rule();
    cursor.advance(5.5);

    for row in &document.items.rows {
        cursor.text(&font, 10.0, X_ITEM, &row[0]);
        cursor.text(&font, 10.0, X_QTY, &row[1]);
        cursor.text(&font, 10.0, X_UNIT, &row[2]);
        cursor.text(&font, 10.0, X_TOTAL, &row[3]);
        cursor.advance(6.0);
    }

    cursor.rule();
    cursor.advance(7.0);

    for (label, value) in &document.items.summary {
        cursor.text(&font_bold, 10.0, X_UNIT, label);
        cursor.text(&font_bold, 10.0, X_TOTAL, value);
        cursor.advance(6.0);
    }
    cursor.advance(8.0);

    cursor.text(&font_bold, 10.0, MARGIN_LEFT, "Terms & Conditions");
    cursor.advance(6.0);
    for term in &document.terms {
        cursor.text(&font, 9.0, MARGIN_LEFT, term);
        cursor.advance(5.0);
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file)).map_err(to_io)?;
    Ok(())
}

/// Draw the logo scaled to the fixed width. The image was probed when the
/// model was built, but it can still fail to decode here; that stays
/// cosmetic and only costs a log line.
fn draw_logo(cursor: &mut PageCursor<'_>, logo: &LogoBlock) {
    let image = match image_crate::open(&logo.path) {
        Ok(image) => image,
        Err(err) => {
            warn!(path = %logo.path.display(), %err, "logo vanished between probe and render");
            return;
        }
    };

    let natural_width_mm = logo.width_px as f32 * 25.4 / LOGO_DPI;
    let natural_height_mm = logo.height_px as f32 * 25.4 / LOGO_DPI;
    let scale = LOGO_WIDTH_MM / natural_width_mm;
    let drawn_height = natural_height_mm * scale;

    cursor.advance(drawn_height);
    Image::from_dynamic_image(&image).add_to_layer(
        cursor.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_LEFT)),
            translate_y: Some(Mm(cursor.y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(LOGO_DPI),
            ..Default::default()
        },
    );
    cursor.advance(8.0);
}

fn to_io(err: printpdf::Error) -> GenerationError {
    GenerationError::Io(io::Error::other(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::build_document;
    use crate::invoice::InvoiceState;
    use crate::models::{CompanyProfile, Currency};

    fn sample_document() -> DocumentModel {
        let mut state = InvoiceState::new(Currency::Usd);
        state.invoice_number = "INV-7".to_string();
        state.customer_name = "Acme".to_string();
        state.add_line_item("Widget", "2", "10").unwrap();
        build_document(&state, &CompanyProfile::default()).unwrap()
    }

    #[test]
    fn writes_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("invoice.pdf");

        render_to_file(&sample_document(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unwritable_destination_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = render_to_file(&sample_document(), &blocker.join("invoice.pdf")).unwrap_err();
        assert!(matches!(err, GenerationError::Io(_)));
    }

    #[test]
    fn many_items_spill_onto_additional_pages() {
        let mut state = InvoiceState::new(Currency::Usd);
        for i in 0..80 {
            state
                .add_line_item(&format!("Item {i}"), "1", "2.50")
                .unwrap();
        }
        let document = build_document(&state, &CompanyProfile::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        render_to_file(&document, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let pages = bytes.windows(6).filter(|w| w == b"/Pages").count();
        assert!(pages >= 1);
        assert!(bytes.starts_with(b"%PDF"));
    }
}
