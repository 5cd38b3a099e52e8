//! Sheet composition
//!
//! Places one label per non-blank slot on the grid, row-major from the top
//! left, against any `LabelSurface`.

use crate::barcode::BarcodeRenderer;
use crate::error::LabelSheetError;
use crate::geometry::{GridGeometry, LabelStyle, LayoutOptions, Rect, Rgb};
use crate::raster::Raster;
use crate::sequence::Slot;
use crate::surface::{ImageRef, LabelSurface, Placement};
use serde::Serialize;

/// Decoded artwork shared by every label on a sheet
pub struct LabelArt<'a> {
    pub logo: &'a Raster,
    pub barcodes: &'a dyn BarcodeRenderer,
}

/// What a composition actually put on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeReport {
    pub labels_drawn: usize,
    /// Blank slots that consumed a grid position
    pub blanks_consumed: usize,
    /// Slots past the grid capacity
    pub undrawn: usize,
}

/// Draw the labels for `slots` onto `surface`
pub fn compose<S: LabelSurface + ?Sized>(
    prefix: &str,
    slots: &[Slot],
    geometry: &GridGeometry,
    style: &LabelStyle,
    options: &LayoutOptions,
    art: &LabelArt<'_>,
    surface: &mut S,
) -> Result<ComposeReport, LabelSheetError> {
    let (page_width, page_height) = surface.page_size();
    if options.clear_background {
        surface.fill_rect(Rect::new(0.0, 0.0, page_width, page_height), Rgb::WHITE);
    }

    let mut report = ComposeReport::default();
    let mut logo: Option<ImageRef> = None;
    let positions = (0..geometry.rows)
        .flat_map(|row| (0..geometry.columns).map(move |col| (row, col)));

    for ((row, col), slot) in positions.zip(slots) {
        let item_id = match slot {
            Slot::Blank => {
                report.blanks_consumed += 1;
                continue;
            }
            Slot::Item(id) => *id,
        };

        // Embedded on the first drawn label only
        let logo_ref = match logo {
            Some(ref image) => image.clone(),
            None => {
                let image = surface.add_image(art.logo)?;
                logo = Some(image.clone());
                image
            }
        };

        tracing::debug!(row, col, item_id, "Drawing label");
        let (x, y) = geometry.cell_origin(row, col, page_height);
        draw_label(
            prefix, item_id, x, y, geometry, style, options, art, &logo_ref, surface,
        )?;
        report.labels_drawn += 1;
    }

    report.undrawn = slots.len().saturating_sub(geometry.capacity());
    if report.undrawn > 0 {
        tracing::warn!(
            undrawn = report.undrawn,
            capacity = geometry.capacity(),
            "Sequence longer than one sheet, extra slots dropped"
        );
    }

    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn draw_label<S: LabelSurface + ?Sized>(
    prefix: &str,
    item_id: i64,
    x: f32,
    y: f32,
    geometry: &GridGeometry,
    style: &LabelStyle,
    options: &LayoutOptions,
    art: &LabelArt<'_>,
    logo: &ImageRef,
    surface: &mut S,
) -> Result<(), LabelSheetError> {
    let border = geometry.label_border;
    let content_height = geometry.content_height();
    let id_text = item_id.to_string();

    let barcode = art.barcodes.render(&id_text)?;
    if barcode.is_empty() {
        return Err(LabelSheetError::Barcode(format!(
            "Failed to create barcode image for {}",
            id_text
        )));
    }
    let barcode_x = x + geometry.label_width - border;
    let barcode_y = y + border;

    // Logo keeps its aspect ratio and never grows past the content height
    let natural_width = art.logo.width() as f32;
    let natural_height = art.logo.height() as f32;
    if natural_height <= 0.0 {
        return Err(LabelSheetError::Asset("Logo has no height".into()));
    }
    let logo_height = natural_height.min(content_height);
    let logo_width = natural_width * logo_height / natural_height;
    let logo_x = x + border;
    let logo_y = y + (geometry.label_height - logo_height) / 2.0;
    let background_width = logo_width + border + style.logo_background_padding;

    let bleed = style.logo_background_bleed;
    surface.fill_rect(
        Rect::new(
            x - bleed,
            y - bleed,
            background_width,
            geometry.label_height + 2.0 * bleed,
        ),
        style.logo_background,
    );
    surface.draw_image(
        logo,
        Placement::upright(logo_x, logo_y, logo_width, logo_height),
    );

    let text_x = logo_x + background_width;
    let text_width = barcode_x - text_x - border - style.barcode_width;
    let block_height = 2.0 * surface.text_height(style.font_size);
    let start_y = y + (geometry.label_height - block_height) / 2.0 + border / 2.0;

    let prefix_width = surface.text_width(prefix, style.font_size);
    surface.draw_text(
        prefix,
        text_x + (text_width - prefix_width) / 2.0,
        start_y + style.line_height(),
        style.font_size,
        style.text_color,
    );
    let id_width = surface.text_width(&id_text, style.font_size);
    surface.draw_text(
        &id_text,
        text_x + (text_width - id_width) / 2.0,
        start_y,
        style.font_size,
        style.text_color,
    );

    let barcode_ref = surface.add_image(&barcode)?;
    surface.draw_image(
        &barcode_ref,
        Placement::quarter_turn(barcode_x, barcode_y, content_height, style.barcode_width),
    );

    if options.debug_outlines {
        surface.stroke_rect(
            Rect::new(x, y, geometry.label_width, geometry.label_height),
            style.debug_outline,
            style.debug_outline_width,
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::Code128Renderer;
    use crate::raster::PixelFormat;
    use crate::sequence::{sequence, SequenceOptions};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Fill(Rect, Rgb),
        Stroke(Rect, Rgb, f32),
        AddImage(u32, u32),
        Image(ImageRef, Placement),
        Text(String, f32, f32),
    }

    /// Surface that records every call; glyphs are half an em wide and
    /// text height equals font size
    #[derive(Default)]
    struct RecordingSurface {
        commands: Vec<Command>,
        images: usize,
    }

    impl LabelSurface for RecordingSurface {
        fn page_size(&self) -> (f32, f32) {
            (612.0, 792.0)
        }

        fn fill_rect(&mut self, rect: Rect, color: Rgb) {
            self.commands.push(Command::Fill(rect, color));
        }

        fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32) {
            self.commands.push(Command::Stroke(rect, color, line_width));
        }

        fn add_image(&mut self, raster: &Raster) -> Result<ImageRef, LabelSheetError> {
            self.images += 1;
            self.commands
                .push(Command::AddImage(raster.width(), raster.height()));
            Ok(ImageRef(format!("Im{}", self.images)))
        }

        fn draw_image(&mut self, image: &ImageRef, placement: Placement) {
            self.commands.push(Command::Image(image.clone(), placement));
        }

        fn draw_text(&mut self, text: &str, x: f32, y: f32, _size: f32, _color: Rgb) {
            self.commands.push(Command::Text(text.to_string(), x, y));
        }

        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size * 0.5
        }

        fn text_height(&self, size: f32) -> f32 {
            size
        }
    }

    struct FailingRenderer;

    impl BarcodeRenderer for FailingRenderer {
        fn render(&self, symbol: &str) -> Result<Raster, LabelSheetError> {
            Err(LabelSheetError::Barcode(format!("cannot encode {}", symbol)))
        }
    }

    fn tall_logo() -> Raster {
        Raster::new(20, 84, PixelFormat::Gray, vec![255; 20 * 84]).unwrap()
    }

    fn run(
        slots: &[Slot],
        options: &LayoutOptions,
    ) -> (RecordingSurface, Result<ComposeReport, LabelSheetError>) {
        let logo = tall_logo();
        let renderer = Code128Renderer::default();
        let art = LabelArt {
            logo: &logo,
            barcodes: &renderer,
        };
        let mut surface = RecordingSurface::default();
        let result = compose(
            "X",
            slots,
            &GridGeometry::default(),
            &LabelStyle::default(),
            options,
            &art,
            &mut surface,
        );
        (surface, result)
    }

    /// (x, y) of every barcode placement, i.e. one entry per drawn label
    fn barcode_anchors(surface: &RecordingSurface) -> Vec<(f32, f32)> {
        surface
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Image(_, p) if p.rotation == crate::surface::Rotation::QuarterTurn => {
                    Some((p.x, p.y))
                }
                _ => None,
            })
            .collect()
    }

    fn texts(surface: &RecordingSurface) -> Vec<String> {
        surface
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Text(t, _, _) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Barcode anchor for the cell at (row, col) on a Letter page
    fn anchor(row: usize, col: usize) -> (f32, f32) {
        let (x, y) = GridGeometry::default().cell_origin(row, col, 792.0);
        (x + 144.0 - 6.0, y + 6.0)
    }

    #[test]
    fn test_repeated_range_fills_first_two_rows() {
        let options = SequenceOptions {
            repeat_count: 2,
            ..Default::default()
        };
        let slots = sequence("1-3", &options);
        let (surface, result) = run(&slots, &LayoutOptions::default());
        let report = result.unwrap();

        assert_eq!(report.labels_drawn, 6);
        assert_eq!(
            barcode_anchors(&surface),
            vec![
                anchor(0, 0),
                anchor(0, 1),
                anchor(0, 2),
                anchor(1, 0),
                anchor(1, 1),
                anchor(1, 2)
            ]
        );
        assert_eq!(
            texts(&surface),
            ["X", "1", "X", "1", "X", "2", "X", "2", "X", "3", "X", "3"]
        );
    }

    #[test]
    fn test_blank_consumes_position() {
        let slots = vec![Slot::Blank, Slot::Item(7)];
        let (surface, result) = run(&slots, &LayoutOptions::default());
        let report = result.unwrap();

        assert_eq!(report.labels_drawn, 1);
        assert_eq!(report.blanks_consumed, 1);
        assert_eq!(barcode_anchors(&surface), vec![anchor(0, 1)]);
    }

    #[test]
    fn test_overflow_truncated_to_capacity() {
        let slots: Vec<Slot> = (1..=35).map(Slot::Item).collect();
        let (surface, result) = run(&slots, &LayoutOptions::default());
        let report = result.unwrap();

        assert_eq!(report.labels_drawn, 30);
        assert_eq!(report.undrawn, 5);
        let anchors = barcode_anchors(&surface);
        assert_eq!(anchors.len(), 30);
        assert_eq!(anchors.last(), Some(&anchor(9, 2)));
    }

    #[test]
    fn test_only_blanks_draws_nothing() {
        let slots = sequence(
            "",
            &SequenceOptions {
                skip_first: 2,
                ..Default::default()
            },
        );
        let (surface, result) = run(&slots, &LayoutOptions::default());
        let report = result.unwrap();

        assert_eq!(report.labels_drawn, 0);
        assert_eq!(report.blanks_consumed, 2);
        // Only the page clear; the logo is never embedded
        assert_eq!(
            surface.commands,
            vec![Command::Fill(Rect::new(0.0, 0.0, 612.0, 792.0), Rgb::WHITE)]
        );
    }

    #[test]
    fn test_identifier_zero_is_drawn() {
        let slots = vec![Slot::Item(0), Slot::Item(1)];
        let (surface, result) = run(&slots, &LayoutOptions::default());
        assert_eq!(result.unwrap().labels_drawn, 2);
        assert_eq!(texts(&surface), ["X", "0", "X", "1"]);
    }

    #[test]
    fn test_barcode_failure_aborts() {
        let logo = tall_logo();
        let art = LabelArt {
            logo: &logo,
            barcodes: &FailingRenderer,
        };
        let mut surface = RecordingSurface::default();
        let err = compose(
            "X",
            &[Slot::Item(1), Slot::Item(2)],
            &GridGeometry::default(),
            &LabelStyle::default(),
            &LayoutOptions::default(),
            &art,
            &mut surface,
        )
        .unwrap_err();

        assert!(matches!(err, LabelSheetError::Barcode(_)));
        assert!(barcode_anchors(&surface).is_empty());
    }

    #[test]
    fn test_single_label_layout() {
        let options = LayoutOptions {
            clear_background: false,
            debug_outlines: false,
        };
        let (surface, result) = run(&[Slot::Item(1)], &options);
        result.unwrap();

        // Cell (0, 0) origin is (45, 693); the 20x84 logo scales to 10x42
        let commands = &surface.commands;
        assert_eq!(commands.len(), 7);
        assert_eq!(commands[0], Command::AddImage(20, 84));
        assert_eq!(
            commands[1],
            Command::Fill(
                Rect::new(40.0, 688.0, 26.0, 64.0),
                LabelStyle::default().logo_background
            )
        );
        assert_eq!(
            commands[2],
            Command::Image(
                ImageRef("Im1".into()),
                Placement::upright(51.0, 699.0, 10.0, 42.0)
            )
        );

        // Text band spans x 77..153; start_y = 693 + (54 - 28) / 2 + 3
        let Command::Text(ref prefix, px, py) = commands[3] else {
            panic!("expected prefix text, got {:?}", commands[3]);
        };
        assert_eq!(prefix, "X");
        assert!((px - 111.5).abs() < 1e-3);
        assert!((py - 725.8).abs() < 1e-3);
        let Command::Text(ref id, ix, iy) = commands[4] else {
            panic!("expected id text, got {:?}", commands[4]);
        };
        assert_eq!(id, "1");
        assert!((ix - 111.5).abs() < 1e-3);
        assert!((iy - 709.0).abs() < 1e-3);

        assert!(matches!(commands[5], Command::AddImage(_, 24)));
        let Command::Image(ref barcode, placement) = commands[6] else {
            panic!("expected barcode image, got {:?}", commands[6]);
        };
        assert_eq!(barcode, &ImageRef("Im2".into()));
        assert_eq!(placement, Placement::quarter_turn(183.0, 699.0, 42.0, 24.0));
        assert_eq!(placement.bounds(), Rect::new(159.0, 699.0, 24.0, 42.0));
    }

    #[test]
    fn test_logo_embedded_once() {
        let slots: Vec<Slot> = (1..=4).map(Slot::Item).collect();
        let (surface, result) = run(&slots, &LayoutOptions::default());
        result.unwrap();

        let logo_adds = surface
            .commands
            .iter()
            .filter(|c| **c == Command::AddImage(20, 84))
            .count();
        assert_eq!(logo_adds, 1);
    }

    #[test]
    fn test_debug_outline_strokes_cell() {
        let options = LayoutOptions {
            clear_background: true,
            debug_outlines: true,
        };
        let (surface, result) = run(&[Slot::Item(3)], &options);
        result.unwrap();

        assert_eq!(
            surface.commands.last(),
            Some(&Command::Stroke(
                Rect::new(45.0, 693.0, 144.0, 54.0),
                Rgb::GREEN,
                1.0
            ))
        );
    }

    #[test]
    fn test_clear_background_disabled() {
        let options = LayoutOptions {
            clear_background: false,
            debug_outlines: false,
        };
        let (surface, result) = run(&[], &options);
        result.unwrap();
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn test_short_logo_keeps_natural_size() {
        let logo = Raster::new(30, 20, PixelFormat::Gray, vec![0; 600]).unwrap();
        let renderer = Code128Renderer::default();
        let art = LabelArt {
            logo: &logo,
            barcodes: &renderer,
        };
        let mut surface = RecordingSurface::default();
        compose(
            "X",
            &[Slot::Item(1)],
            &GridGeometry::default(),
            &LabelStyle::default(),
            &LayoutOptions::default(),
            &art,
            &mut surface,
        )
        .unwrap();

        // Centred vertically: 693 + (54 - 20) / 2
        assert!(surface.commands.contains(&Command::Image(
            ImageRef("Im1".into()),
            Placement::upright(51.0, 710.0, 30.0, 20.0)
        )));
    }
}
