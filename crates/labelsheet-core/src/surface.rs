//! Drawing surface the composer issues commands against
//!
//! Coordinates are points with the origin at the bottom-left of the page,
//! y growing upwards. `PdfPage` is the production implementation.

use crate::error::LabelSheetError;
use crate::geometry::{Rect, Rgb};
use crate::raster::Raster;

/// Handle returned by `LabelSurface::add_image`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    /// 90 degrees counter-clockwise about the placement anchor
    QuarterTurn,
}

/// Where an image lands on the page
///
/// `width` and `height` are the pre-rotation size. With
/// `Rotation::QuarterTurn` the image swings about `(x, y)`, so it covers
/// `[x - height, x]` horizontally and `[y, y + width]` vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: Rotation,
}

impl Placement {
    pub fn upright(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: Rotation::None,
        }
    }

    pub fn quarter_turn(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: Rotation::QuarterTurn,
        }
    }

    /// Page area covered after rotation
    pub fn bounds(&self) -> Rect {
        match self.rotation {
            Rotation::None => Rect::new(self.x, self.y, self.width, self.height),
            Rotation::QuarterTurn => {
                Rect::new(self.x - self.height, self.y, self.height, self.width)
            }
        }
    }

    /// PDF `cm` operands mapping the unit square onto this placement
    pub fn matrix(&self) -> [f32; 6] {
        match self.rotation {
            Rotation::None => [self.width, 0.0, 0.0, self.height, self.x, self.y],
            // rotate(90) * scale(w, h), translated to the anchor
            Rotation::QuarterTurn => [0.0, self.width, -self.height, 0.0, self.x, self.y],
        }
    }
}

pub trait LabelSurface {
    /// (width, height) of the page in points
    fn page_size(&self) -> (f32, f32);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32);

    /// Register an image for later `draw_image` calls
    fn add_image(&mut self, raster: &Raster) -> Result<ImageRef, LabelSheetError>;

    fn draw_image(&mut self, image: &ImageRef, placement: Placement);

    /// Draw one line of text with its baseline starting at (x, y)
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgb);

    fn text_width(&self, text: &str, size: f32) -> f32;

    fn text_height(&self, size: f32) -> f32;
}
