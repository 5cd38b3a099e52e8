//! Raster images handed to the drawing surface
//!
//! Barcodes are rendered straight into a grayscale `Raster`; the logo
//! arrives as PNG bytes and is decoded with the `png` crate.

use crate::error::LabelSheetError;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// 8-bit pixel buffer, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, LabelSheetError> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(LabelSheetError::Asset(format!(
                "Raster of {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Decode PNG bytes, expanding palettes and stripping 16-bit channels
    pub fn decode_png(bytes: &[u8]) -> Result<Self, LabelSheetError> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let mut reader = decoder
            .read_info()
            .map_err(|e| LabelSheetError::Asset(format!("Invalid PNG: {}", e)))?;
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buffer)
            .map_err(|e| LabelSheetError::Asset(format!("Failed to decode PNG: {}", e)))?;
        buffer.truncate(info.buffer_size());

        let (format, data) = match info.color_type {
            png::ColorType::Grayscale => (PixelFormat::Gray, buffer),
            png::ColorType::Rgb => (PixelFormat::Rgb, buffer),
            png::ColorType::Rgba => (PixelFormat::Rgba, buffer),
            png::ColorType::GrayscaleAlpha => {
                let rgba = buffer
                    .chunks_exact(2)
                    .flat_map(|px| [px[0], px[0], px[0], px[1]])
                    .collect();
                (PixelFormat::Rgba, rgba)
            }
            png::ColorType::Indexed => {
                return Err(LabelSheetError::Asset(
                    "Indexed PNG was not expanded".into(),
                ))
            }
        };

        Self::new(info.width, info.height, format, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Split into colour samples and an optional alpha plane
    pub fn split_alpha(&self) -> (Vec<u8>, Option<Vec<u8>>) {
        match self.format {
            PixelFormat::Gray | PixelFormat::Rgb => (self.data.clone(), None),
            PixelFormat::Rgba => {
                let pixels = self.data.len() / 4;
                let mut color = Vec::with_capacity(pixels * 3);
                let mut alpha = Vec::with_capacity(pixels);
                for px in self.data.chunks_exact(4) {
                    color.extend_from_slice(&px[..3]);
                    alpha.push(px[3]);
                }
                // Fully opaque images do not need a soft mask
                if alpha.iter().all(|&a| a == 255) {
                    (color, None)
                } else {
                    (color, Some(alpha))
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Raster::new(2, 2, PixelFormat::Rgb, vec![0; 11]).is_err());
        assert!(Raster::new(2, 2, PixelFormat::Rgb, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_decode_rgba_png() {
        let pixels = [255, 0, 0, 128, 0, 255, 0, 255];
        let bytes = encode_png(2, 1, png::ColorType::Rgba, &pixels);
        let raster = Raster::decode_png(&bytes).unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 1);
        assert_eq!(raster.format(), PixelFormat::Rgba);
        assert_eq!(raster.data(), &pixels);
    }

    #[test]
    fn test_decode_gray_alpha_expands_to_rgba() {
        let bytes = encode_png(1, 1, png::ColorType::GrayscaleAlpha, &[200, 10]);
        let raster = Raster::decode_png(&bytes).unwrap();
        assert_eq!(raster.format(), PixelFormat::Rgba);
        assert_eq!(raster.data(), &[200, 200, 200, 10]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = Raster::decode_png(b"definitely not a png").unwrap_err();
        assert!(matches!(err, LabelSheetError::Asset(_)));
    }

    #[test]
    fn test_split_alpha_translucent() {
        let raster = Raster::new(1, 2, PixelFormat::Rgba, vec![1, 2, 3, 0, 4, 5, 6, 255]).unwrap();
        let (color, alpha) = raster.split_alpha();
        assert_eq!(color, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(alpha, Some(vec![0, 255]));
    }

    #[test]
    fn test_split_alpha_opaque_drops_mask() {
        let raster = Raster::new(1, 1, PixelFormat::Rgba, vec![9, 8, 7, 255]).unwrap();
        let (color, alpha) = raster.split_alpha();
        assert_eq!(color, vec![9, 8, 7]);
        assert!(alpha.is_none());
    }
}
