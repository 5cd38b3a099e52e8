//! Label sheet generation
//!
//! Turns identifier text like `"1-10, 15"` into a one-page PDF of labels,
//! each with a prefix line, the identifier, a logo and a vertical CODE128
//! barcode, laid out on a fixed 3 x 10 grid.
//!
//! The pipeline is `sequence` -> `PdfPage` -> `compose` -> `PdfPage::finish`.
//! `generate_labels` runs all of it in one call.

pub mod barcode;
pub mod command;
pub mod compose;
pub mod error;
pub mod font;
pub mod geometry;
pub mod pdf_page;
pub mod raster;
pub mod sequence;
pub mod surface;

pub use barcode::{BarcodeRenderer, Code128Renderer};
pub use command::{GenerateMetrics, GenerateRequest, GenerateResult, LabelAssets};
pub use compose::{compose, ComposeReport, LabelArt};
pub use error::LabelSheetError;
pub use font::LabelFont;
pub use geometry::{GridGeometry, LabelStyle, LayoutOptions, Rect, Rgb};
pub use pdf_page::PdfPage;
pub use raster::Raster;
pub use sequence::{sequence, SequenceOptions, SequenceSummary, Slot};
pub use surface::{ImageRef, LabelSurface, Placement, Rotation};

/// A finished sheet plus what went into it
#[derive(Debug, Clone)]
pub struct GeneratedSheet {
    pub pdf: Vec<u8>,
    pub summary: SequenceSummary,
    pub report: ComposeReport,
}

impl GeneratedSheet {
    pub fn metrics(&self) -> GenerateMetrics {
        GenerateMetrics {
            slot_count: self.summary.total_slots,
            labels_drawn: self.report.labels_drawn,
            blanks_consumed: self.report.blanks_consumed,
            undrawn: self.report.undrawn,
            output_size_bytes: self.pdf.len(),
        }
    }
}

/// Generate the label sheet PDF for `request`
pub fn generate_labels(
    request: &GenerateRequest,
    assets: &LabelAssets,
) -> Result<Vec<u8>, LabelSheetError> {
    generate_sheet(request, assets).map(|sheet| sheet.pdf)
}

/// Like `generate_labels`, but also returns the sequence and layout counts
pub fn generate_sheet(
    request: &GenerateRequest,
    assets: &LabelAssets,
) -> Result<GeneratedSheet, LabelSheetError> {
    let geometry = GridGeometry::default();
    let style = LabelStyle::default();

    let slots = sequence(&request.ids, &request.sequence_options());
    let summary = SequenceSummary::new(&slots, geometry.capacity());

    if assets.logo.is_empty() {
        return Err(LabelSheetError::Asset("Logo image is required".into()));
    }
    let logo = Raster::decode_png(&assets.logo)?;
    let font = match &assets.font {
        Some(bytes) => LabelFont::from_truetype(bytes.clone())?,
        None => LabelFont::Helvetica,
    };
    let mut page = match &assets.template {
        Some(bytes) => PdfPage::from_template(bytes, font)?,
        None => PdfPage::blank(pdf_page::LETTER_SIZE.0, pdf_page::LETTER_SIZE.1, font)?,
    };

    let renderer = Code128Renderer::default();
    let art = LabelArt {
        logo: &logo,
        barcodes: &renderer,
    };
    let report = compose(
        &request.prefix,
        &slots,
        &geometry,
        &style,
        &request.layout_options(),
        &art,
        &mut page,
    )?;
    let pdf = page.finish()?;

    tracing::info!(
        slots = summary.total_slots,
        labels = report.labels_drawn,
        output_bytes = pdf.len(),
        "Generated label sheet"
    );

    Ok(GeneratedSheet {
        pdf,
        summary,
        report,
    })
}

/// Parse a JSON `GenerateRequest`; missing fields take their defaults
pub fn parse_request(json: &str) -> Result<GenerateRequest, LabelSheetError> {
    serde_json::from_str(json).map_err(|e| LabelSheetError::Serialization(e.to_string()))
}

/// Run a request and fold the outcome into a serializable result
pub fn process_request(request: &GenerateRequest, assets: &LabelAssets) -> GenerateResult {
    match generate_sheet(request, assets) {
        Ok(sheet) => GenerateResult::ok(&sheet.pdf, sheet.metrics()),
        Err(e) => GenerateResult::failed(e),
    }
}
