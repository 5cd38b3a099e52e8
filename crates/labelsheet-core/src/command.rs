use crate::geometry::LayoutOptions;
use crate::sequence::SequenceOptions;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One label sheet to generate, as sent by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prefix: String,
    /// Raw identifier text, e.g. "1-10, 15"
    pub ids: String,
    pub skip_first: usize,
    pub repeat_count: usize,
    pub repeat_single_values: bool,
    pub clear_background: bool,
    pub debug_outlines: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        let sequence = SequenceOptions::default();
        let layout = LayoutOptions::default();
        Self {
            prefix: "CHTL".to_string(),
            ids: String::new(),
            skip_first: sequence.skip_first,
            repeat_count: sequence.repeat_count,
            repeat_single_values: sequence.repeat_single_values,
            clear_background: layout.clear_background,
            debug_outlines: layout.debug_outlines,
        }
    }
}

impl GenerateRequest {
    pub fn sequence_options(&self) -> SequenceOptions {
        SequenceOptions {
            skip_first: self.skip_first,
            repeat_count: self.repeat_count,
            repeat_single_values: self.repeat_single_values,
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            clear_background: self.clear_background,
            debug_outlines: self.debug_outlines,
        }
    }
}

/// Raw asset bytes for a generation
#[derive(Debug, Clone, Default)]
pub struct LabelAssets {
    /// Template PDF; a blank Letter page is used when absent
    pub template: Option<Vec<u8>>,
    /// TrueType font; Helvetica is used when absent
    pub font: Option<Vec<u8>>,
    /// Logo PNG, required
    pub logo: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub success: bool,
    /// Base64-encoded PDF data
    pub data: Option<String>,
    pub error: Option<String>,
    pub metrics: Option<GenerateMetrics>,
}

impl GenerateResult {
    pub fn ok(pdf: &[u8], metrics: GenerateMetrics) -> Self {
        Self {
            success: true,
            data: Some(base64::engine::general_purpose::STANDARD.encode(pdf)),
            error: None,
            metrics: Some(metrics),
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            metrics: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateMetrics {
    pub slot_count: usize,
    pub labels_drawn: usize,
    pub blanks_consumed: usize,
    pub undrawn: usize,
    pub output_size_bytes: usize,
}
