//! Stateful label session
//!
//! Holds the form state and loaded assets in Rust so the page script only
//! forwards input events and downloads the result.

use crate::assets::{fetch_assets, AssetCache, AssetUrls};
use labelsheet_core::{
    generate_sheet, sequence, GenerateRequest, GeneratedSheet, GridGeometry, LabelAssets,
    SequenceSummary,
};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct LabelSession {
    request: GenerateRequest,
    cache: RefCell<AssetCache>,
    progress_callback: Option<js_sys::Function>,
}

impl Default for LabelSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl LabelSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            request: GenerateRequest::default(),
            cache: RefCell::new(AssetCache::default()),
            progress_callback: None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn prefix(&self) -> String {
        self.request.prefix.clone()
    }

    #[wasm_bindgen(js_name = setPrefix)]
    pub fn set_prefix(&mut self, prefix: &str) {
        self.request.prefix = prefix.to_string();
    }

    /// Raw identifier text, e.g. "1-10, 15"
    #[wasm_bindgen(js_name = setIds)]
    pub fn set_ids(&mut self, ids: &str) {
        self.request.ids = ids.to_string();
    }

    /// Leave `count` cells empty at the start of the sheet when `enabled`
    #[wasm_bindgen(js_name = setSkipFirst)]
    pub fn set_skip_first(&mut self, enabled: bool, count: usize) {
        self.request.skip_first = if enabled { count } else { 0 };
    }

    #[wasm_bindgen(js_name = setRepeatCount)]
    pub fn set_repeat_count(&mut self, count: usize) {
        self.request.repeat_count = count;
    }

    /// Apply the repeat count to single identifiers as well as ranges
    #[wasm_bindgen(js_name = setRepeatSingleValues)]
    pub fn set_repeat_single_values(&mut self, enabled: bool) {
        self.request.repeat_single_values = enabled;
    }

    #[wasm_bindgen(js_name = setDebugOutlines)]
    pub fn set_debug_outlines(&mut self, enabled: bool) {
        self.request.debug_outlines = enabled;
    }

    #[wasm_bindgen(js_name = setClearBackground)]
    pub fn set_clear_background(&mut self, enabled: bool) {
        self.request.clear_background = enabled;
    }

    /// Set a progress callback function
    /// Callback signature: (current: number, total: number, message: string) => void
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Fetch template, font and logo unless already loaded from these URLs
    #[wasm_bindgen(js_name = loadAssets)]
    pub async fn load_assets(
        &self,
        template_url: Option<String>,
        font_url: Option<String>,
        logo_url: String,
    ) -> Result<(), JsValue> {
        let urls = AssetUrls {
            template: template_url,
            font: font_url,
            logo: logo_url,
        };
        if self.cache.borrow().is_current(&urls) {
            return Ok(());
        }

        let assets = fetch_assets(&urls).await?;
        web_sys::console::log_1(
            &format!(
                "Loaded label assets: logo {}, template {}, font {}",
                crate::format_bytes(assets.logo.len()),
                crate::format_bytes(assets.template.as_ref().map_or(0, Vec::len)),
                crate::format_bytes(assets.font.as_ref().map_or(0, Vec::len)),
            )
            .into(),
        );
        self.cache.borrow_mut().store(Some(urls), assets);
        Ok(())
    }

    /// Use asset bytes supplied by the page instead of fetching them
    #[wasm_bindgen(js_name = setAssets)]
    pub fn set_assets(&self, template: Option<Vec<u8>>, font: Option<Vec<u8>>, logo: Vec<u8>) {
        self.set_assets_internal(LabelAssets {
            template,
            font,
            logo,
        });
    }

    fn set_assets_internal(&self, assets: LabelAssets) {
        self.cache.borrow_mut().store(None, assets);
    }

    #[wasm_bindgen(js_name = hasAssets)]
    pub fn has_assets(&self) -> bool {
        self.cache.borrow().assets().is_some()
    }

    fn preview_sequence_internal(&self) -> SequenceSummary {
        let slots = sequence(&self.request.ids, &self.request.sequence_options());
        SequenceSummary::new(&slots, GridGeometry::default().capacity())
    }

    /// Slot counts for the current input as JSON
    #[wasm_bindgen(js_name = previewSequence)]
    pub fn preview_sequence(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.preview_sequence_internal())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Internal generation (testable without JsValue)
    fn generate_internal(&self) -> Result<GeneratedSheet, String> {
        let cache = self.cache.borrow();
        let assets = cache
            .assets()
            .ok_or_else(|| "Assets not loaded".to_string())?;
        generate_sheet(&self.request, assets).map_err(|e| e.to_string())
    }

    /// Generate the sheet and return the PDF as Uint8Array
    pub fn generate(&self) -> Result<js_sys::Uint8Array, JsValue> {
        self.report_progress(0, 100, "Starting...")?;
        self.report_progress(10, 100, "Drawing labels...")?;

        let sheet = self
            .generate_internal()
            .map_err(|e| JsValue::from_str(&format!("Generation failed: {}", e)))?;

        let metrics = sheet.metrics();
        web_sys::console::log_1(
            &format!(
                "Generated {} labels ({} blank, {} dropped), {}",
                metrics.labels_drawn,
                metrics.blanks_consumed,
                metrics.undrawn,
                crate::format_bytes(metrics.output_size_bytes)
            )
            .into(),
        );
        self.report_progress(100, 100, "Complete")?;

        let array = js_sys::Uint8Array::new_with_length(sheet.pdf.len() as u32);
        array.copy_from(&sheet.pdf);
        Ok(array)
    }

    /// Report progress to JavaScript callback
    fn report_progress(&self, current: u32, total: u32, message: &str) -> Result<(), JsValue> {
        if let Some(ref callback) = self.progress_callback {
            let this = JsValue::null();
            let _ = callback.call3(
                &this,
                &JsValue::from(current),
                &JsValue::from(total),
                &JsValue::from_str(message),
            );
        }
        Ok(())
    }
}
