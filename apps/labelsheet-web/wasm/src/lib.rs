//! WASM bindings for label sheet generation
//!
//! State lives in a `LabelSession`; JavaScript only wires form inputs to
//! its setters and downloads the generated PDF.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { LabelSession } from './pkg/labelsheet_wasm.js';
//!
//! await init();
//!
//! const session = new LabelSession();
//! session.setProgressCallback((current, total, msg) => updateUI(current, total, msg));
//! await session.loadAssets("template.pdf", "Roboto-Medium.ttf", "logo-white.png");
//! session.setPrefix("CHTL");
//! session.setIds("1-10, 15");
//! session.setSkipFirst(true, 3);
//! console.log(session.previewSequence());
//! const pdf = session.generate();
//! downloadBlob(pdf, "labels.pdf");
//! ```

pub mod assets;
pub mod session;

use labelsheet_core::{GridGeometry, SequenceOptions, SequenceSummary};
use wasm_bindgen::prelude::*;

pub use session::LabelSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn summarize(ids: &str, skip_first: usize, repeat_count: usize) -> SequenceSummary {
    let options = SequenceOptions {
        skip_first,
        repeat_count,
        ..Default::default()
    };
    let slots = labelsheet_core::sequence(ids, &options);
    SequenceSummary::new(&slots, GridGeometry::default().capacity())
}

/// Slot counts for identifier text without creating a session
#[wasm_bindgen]
pub fn preview_sequence(
    ids: &str,
    skip_first: usize,
    repeat_count: usize,
) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&summarize(ids, skip_first, repeat_count))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// One-shot generation from a JSON request
///
/// Returns a JSON `GenerateResult` with the PDF base64-encoded, so errors
/// come back as data rather than exceptions.
#[wasm_bindgen]
pub fn generate_from_json(
    request_json: &str,
    logo: Vec<u8>,
    template: Option<Vec<u8>>,
    font: Option<Vec<u8>>,
) -> String {
    let result = match labelsheet_core::parse_request(request_json) {
        Ok(request) => {
            let assets = labelsheet_core::LabelAssets {
                template,
                font,
                logo,
            };
            labelsheet_core::process_request(&request, &assets)
        }
        Err(e) => labelsheet_core::GenerateResult::failed(e),
    };
    serde_json::to_string(&result).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"data":null,"error":"Serialization error: {}","metrics":null}}"#,
            e
        )
    })
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
