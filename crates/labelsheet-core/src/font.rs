//! Label font metrics
//!
//! Text is drawn with a single-byte WinAnsi encoding limited to printable
//! ASCII. A TrueType font is measured with `ttf-parser` and embedded whole;
//! without one the standard Helvetica Type1 font is referenced by name.

use crate::error::LabelSheetError;

pub const FIRST_CHAR: u8 = 32;
pub const LAST_CHAR: u8 = 126;

/// Glyph drawn in place of characters outside `FIRST_CHAR..=LAST_CHAR`
const REPLACEMENT: u8 = b'?';

/// Helvetica AFM advance widths for WinAnsi codes 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Metrics in 1000-unit glyph space, as PDF font dictionaries expect
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub bbox: [i32; 4],
    pub flags: i64,
    /// Advance widths for `FIRST_CHAR..=LAST_CHAR`
    pub widths: Vec<u16>,
}

#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    pub name: String,
    pub data: Vec<u8>,
    pub metrics: FontMetrics,
}

#[derive(Debug, Clone, Default)]
pub enum LabelFont {
    /// Standard 14 font, never embedded
    #[default]
    Helvetica,
    TrueType(TrueTypeFont),
}

impl LabelFont {
    /// Parse a TrueType/OpenType font file
    pub fn from_truetype(data: Vec<u8>) -> Result<Self, LabelSheetError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| LabelSheetError::Asset(format!("Invalid font: {}", e)))?;

        let units = face.units_per_em().max(1) as i32;
        let scale = |v: i16| (v as i32) * 1000 / units;

        let notdef = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(0);
        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                let advance = face
                    .glyph_index(code as char)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .unwrap_or(notdef);
                (advance as i32 * 1000 / units) as u16
            })
            .collect();

        let bbox = face.global_bounding_box();
        let ascent = scale(face.ascender());
        let mut flags = 32; // Nonsymbolic
        if face.is_monospaced() {
            flags |= 1;
        }

        let metrics = FontMetrics {
            ascent,
            descent: scale(face.descender()),
            cap_height: face.capital_height().map(scale).unwrap_or(ascent),
            bbox: [
                scale(bbox.x_min),
                scale(bbox.y_min),
                scale(bbox.x_max),
                scale(bbox.y_max),
            ],
            flags,
            widths,
        };

        let name = postscript_name(&face).unwrap_or_else(|| "LabelFont".to_string());

        Ok(LabelFont::TrueType(TrueTypeFont {
            name,
            data,
            metrics,
        }))
    }

    pub fn metrics(&self) -> FontMetrics {
        match self {
            LabelFont::Helvetica => FontMetrics {
                ascent: 718,
                descent: -207,
                cap_height: 718,
                bbox: [-166, -225, 1000, 931],
                flags: 32,
                widths: HELVETICA_WIDTHS.to_vec(),
            },
            LabelFont::TrueType(font) => font.metrics.clone(),
        }
    }

    pub fn base_font(&self) -> &str {
        match self {
            LabelFont::Helvetica => "Helvetica",
            LabelFont::TrueType(font) => &font.name,
        }
    }

    fn width_of_code(&self, code: u8) -> u16 {
        let index = (code - FIRST_CHAR) as usize;
        match self {
            LabelFont::Helvetica => HELVETICA_WIDTHS[index],
            LabelFont::TrueType(font) => font.metrics.widths.get(index).copied().unwrap_or(0),
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_text(text)
            .into_iter()
            .map(|code| self.width_of_code(code) as u32)
            .sum();
        units as f32 * size / 1000.0
    }

    /// Ascent-to-descent height in points at `size`
    pub fn height_at_size(&self, size: f32) -> f32 {
        let (ascent, descent) = match self {
            LabelFont::Helvetica => (718, -207),
            LabelFont::TrueType(font) => (font.metrics.ascent, font.metrics.descent),
        };
        (ascent - descent) as f32 * size / 1000.0
    }
}

/// Encode text as single-byte codes in `FIRST_CHAR..=LAST_CHAR`
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if (FIRST_CHAR as char..=LAST_CHAR as char).contains(&c) {
                c as u8
            } else {
                REPLACEMENT
            }
        })
        .collect()
}

fn postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
        .map(|name| {
            name.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|name| !name.is_empty())
}
