//! Barcode rendering capability
//!
//! The composer only needs "symbol text in, raster out". CODE128 encoding is
//! done by `barcoders`; the module pattern is then rasterized into a
//! grayscale strip where bars run top to bottom.

use crate::error::LabelSheetError;
use crate::raster::{PixelFormat, Raster};
use barcoders::sym::code128::Code128;

/// Prefix selecting CODE128 character set B (printable ASCII)
const CHARSET_B: char = '\u{0181}';

const BAR: u8 = 0;
const SPACE: u8 = 255;

/// Something that turns symbol text into a barcode image
pub trait BarcodeRenderer {
    fn render(&self, symbol: &str) -> Result<Raster, LabelSheetError>;
}

/// CODE128 (set B) renderer with no quiet zone
#[derive(Debug, Clone)]
pub struct Code128Renderer {
    /// Pixels per barcode module
    pub module_width: u32,
    /// Pixel length of each bar
    pub bar_height: u32,
}

impl Default for Code128Renderer {
    fn default() -> Self {
        Self {
            module_width: 2,
            bar_height: 24,
        }
    }
}

impl Code128Renderer {
    /// Encode to the raw module pattern (1 = bar, 0 = space)
    pub fn encode(&self, symbol: &str) -> Result<Vec<u8>, LabelSheetError> {
        if symbol.is_empty() {
            return Err(LabelSheetError::Barcode("Empty barcode symbol".into()));
        }
        let data = format!("{}{}", CHARSET_B, symbol);
        let barcode = Code128::new(data)
            .map_err(|e| LabelSheetError::Barcode(format!("{}: {}", symbol, e)))?;
        Ok(barcode.encode())
    }
}

impl BarcodeRenderer for Code128Renderer {
    fn render(&self, symbol: &str) -> Result<Raster, LabelSheetError> {
        let modules = self.encode(symbol)?;
        if modules.is_empty() || self.module_width == 0 || self.bar_height == 0 {
            return Err(LabelSheetError::Barcode(format!(
                "No image data for {}",
                symbol
            )));
        }

        let row: Vec<u8> = modules
            .iter()
            .flat_map(|&m| {
                let px = if m == 1 { BAR } else { SPACE };
                std::iter::repeat(px).take(self.module_width as usize)
            })
            .collect();
        let width = row.len() as u32;

        let mut data = Vec::with_capacity(row.len() * self.bar_height as usize);
        for _ in 0..self.bar_height {
            data.extend_from_slice(&row);
        }

        Raster::new(width, self.bar_height, PixelFormat::Gray, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_starts_and_ends_with_bar() {
        let modules = Code128Renderer::default().encode("12345").unwrap();
        assert_eq!(modules.first(), Some(&1));
        assert_eq!(modules.last(), Some(&1));
    }

    #[test]
    fn test_render_dimensions() {
        let renderer = Code128Renderer {
            module_width: 3,
            bar_height: 10,
        };
        let modules = renderer.encode("42").unwrap();
        let raster = renderer.render("42").unwrap();
        assert_eq!(raster.width() as usize, modules.len() * 3);
        assert_eq!(raster.height(), 10);
        assert_eq!(raster.format(), PixelFormat::Gray);
    }

    #[test]
    fn test_render_rows_identical() {
        let raster = Code128Renderer::default().render("-7").unwrap();
        let width = raster.width() as usize;
        let first = &raster.data()[..width];
        assert!(raster.data().chunks_exact(width).all(|row| row == first));
        assert!(first.iter().all(|&px| px == BAR || px == SPACE));
    }

    #[test]
    fn test_different_symbols_differ() {
        let renderer = Code128Renderer::default();
        assert_ne!(renderer.encode("1").unwrap(), renderer.encode("2").unwrap());
    }

    #[test]
    fn test_empty_symbol_fails() {
        let err = Code128Renderer::default().render("").unwrap_err();
        assert!(matches!(err, LabelSheetError::Barcode(_)));
    }

    #[test]
    fn test_zero_sized_renderer_fails() {
        let renderer = Code128Renderer {
            module_width: 0,
            bar_height: 24,
        };
        assert!(renderer.render("1").is_err());
    }
}
