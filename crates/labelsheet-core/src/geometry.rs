//! Sheet geometry and label styling constants
//!
//! All values are PDF points (1/72 inch) with a bottom-left origin. The
//! defaults match 2" x 0.75" label stock on a US Letter sheet.

use serde::{Deserialize, Serialize};

/// RGB colour with components in 0-1 range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Axis-aligned rectangle anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Grid of label cells on one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridGeometry {
    pub columns: usize,
    pub rows: usize,
    pub label_width: f32,
    pub label_height: f32,
    /// Offset of the first column from the left page edge
    pub edge_margin_x: f32,
    /// Offset of the first row from the top page edge
    pub edge_margin_y: f32,
    pub inter_margin_x: f32,
    pub inter_margin_y: f32,
    /// Inset padding used for content inside each cell
    pub label_border: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 10,
            label_width: 144.0,
            label_height: 54.0,
            edge_margin_x: 45.0,
            edge_margin_y: 45.0,
            inter_margin_x: 45.0,
            inter_margin_y: 18.0,
            label_border: 6.0,
        }
    }
}

impl GridGeometry {
    /// Number of slots one sheet can hold
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Bottom-left corner of the cell at (row, col) on a page of the given height
    pub fn cell_origin(&self, row: usize, col: usize, page_height: f32) -> (f32, f32) {
        let x = self.edge_margin_x + col as f32 * (self.label_width + self.inter_margin_x);
        let y = page_height
            - self.edge_margin_y
            - (row + 1) as f32 * self.label_height
            - row as f32 * self.inter_margin_y;
        (x, y)
    }

    pub fn cell_rect(&self, row: usize, col: usize, page_height: f32) -> Rect {
        let (x, y) = self.cell_origin(row, col, page_height);
        Rect::new(x, y, self.label_width, self.label_height)
    }

    /// Height available for content inside a cell
    pub fn content_height(&self) -> f32 {
        self.label_height - 2.0 * self.label_border
    }

    /// Whether the whole grid stays on a page of the given size
    ///
    /// Composition does not call this; the geometry is fixed to a known
    /// label stock.
    pub fn fits(&self, page_width: f32, page_height: f32) -> bool {
        let cols = self.columns as f32;
        let rows = self.rows as f32;
        let used_width = self.edge_margin_x
            + cols * self.label_width
            + (cols - 1.0).max(0.0) * self.inter_margin_x;
        let used_height = self.edge_margin_y
            + rows * self.label_height
            + (rows - 1.0).max(0.0) * self.inter_margin_y;
        used_width <= page_width && used_height <= page_height
    }
}

/// Fixed look of a single label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyle {
    /// Post-rotation width of the vertical barcode
    pub barcode_width: f32,
    pub font_size: f32,
    /// Multiplier applied to font size for line spacing
    pub line_height_factor: f32,
    pub logo_background: Rgb,
    /// Overscan of the logo background past the cell on each side
    pub logo_background_bleed: f32,
    /// Extra width of the logo background beyond logo + border
    pub logo_background_padding: f32,
    pub text_color: Rgb,
    pub debug_outline: Rgb,
    pub debug_outline_width: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            barcode_width: 24.0,
            font_size: 14.0,
            line_height_factor: 1.2,
            // #722918
            logo_background: Rgb::new(0.447, 0.161, 0.094),
            logo_background_bleed: 5.0,
            logo_background_padding: 10.0,
            text_color: Rgb::BLACK,
            debug_outline: Rgb::GREEN,
            debug_outline_width: 1.0,
        }
    }
}

impl LabelStyle {
    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_factor
    }
}

/// Toggles applied to a whole generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Paint the page white before drawing labels, hiding template artwork
    pub clear_background: bool,
    /// Outline every drawn cell
    pub debug_outlines: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            clear_background: true,
            debug_outlines: false,
        }
    }
}
