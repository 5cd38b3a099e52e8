//! lopdf-backed label surface
//!
//! Draws onto page 1 of a template PDF (or a generated blank page). Drawing
//! calls only buffer content operations; `finish` appends them as a new
//! content stream and serializes the document.

use crate::error::LabelSheetError;
use crate::font::{encode_text, LabelFont, FIRST_CHAR, LAST_CHAR};
use crate::geometry::{Rect, Rgb};
use crate::raster::{PixelFormat, Raster};
use crate::surface::{ImageRef, LabelSurface, Placement};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::Write;

/// US Letter in points
pub const LETTER_SIZE: (f32, f32) = (612.0, 792.0);

/// Guard against cyclic `Parent` chains in malformed page trees
const MAX_TREE_DEPTH: usize = 32;

pub struct PdfPage {
    doc: Document,
    page_id: ObjectId,
    origin: (f32, f32),
    size: (f32, f32),
    resources: Dictionary,
    operations: Vec<Operation>,
    font: LabelFont,
    font_resource: String,
}

impl PdfPage {
    /// Open page 1 of a template PDF
    pub fn from_template(bytes: &[u8], font: LabelFont) -> Result<Self, LabelSheetError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| LabelSheetError::Asset(format!("Invalid template PDF: {}", e)))?;
        let page_id = doc
            .get_pages()
            .get(&1)
            .copied()
            .ok_or_else(|| LabelSheetError::Asset("Template PDF has no pages".into()))?;
        Self::from_document(doc, page_id, font)
    }

    /// Single empty page of the given size
    pub fn blank(width: f32, height: f32, font: LabelFont) -> Result<Self, LabelSheetError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            "Resources" => Dictionary::new(),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Self::from_document(doc, page_id, font)
    }

    fn from_document(
        doc: Document,
        page_id: ObjectId,
        font: LabelFont,
    ) -> Result<Self, LabelSheetError> {
        let media_box = match inherited(&doc, page_id, b"MediaBox") {
            Some(obj) => parse_box(resolve(&doc, obj))?,
            None => [0.0, 0.0, LETTER_SIZE.0, LETTER_SIZE.1],
        };

        let mut resources = match inherited(&doc, page_id, b"Resources") {
            Some(obj) => resolve(&doc, obj).as_dict().cloned().unwrap_or_default(),
            None => Dictionary::new(),
        };
        // Categories we add to must be inline so they can be edited locally
        for category in [b"Font".as_slice(), b"XObject".as_slice()] {
            if let Ok(id) = resources.get(category).and_then(Object::as_reference) {
                let inline = doc
                    .get_object(id)
                    .and_then(Object::as_dict)
                    .cloned()
                    .unwrap_or_default();
                resources.set(category.to_vec(), Object::Dictionary(inline));
            }
        }

        let mut page = Self {
            doc,
            page_id,
            origin: (media_box[0], media_box[1]),
            size: (media_box[2] - media_box[0], media_box[3] - media_box[1]),
            resources,
            operations: Vec::new(),
            font,
            font_resource: String::new(),
        };
        page.font_resource = page.embed_font()?;
        Ok(page)
    }

    fn embed_font(&mut self) -> Result<String, LabelSheetError> {
        let font_dict = match &self.font {
            LabelFont::Helvetica => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            },
            LabelFont::TrueType(ttf) => {
                let file_id = self.doc.add_object(Stream::new(
                    dictionary! {
                        "Length1" => ttf.data.len() as i64,
                        "Filter" => "FlateDecode",
                    },
                    flate_compress(&ttf.data)?,
                ));
                let m = &ttf.metrics;
                let descriptor_id = self.doc.add_object(dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => ttf.name.as_str(),
                    "Flags" => m.flags,
                    "FontBBox" => m.bbox.iter().map(|&v| Object::Integer(v as i64)).collect::<Vec<_>>(),
                    "ItalicAngle" => 0,
                    "Ascent" => m.ascent as i64,
                    "Descent" => m.descent as i64,
                    "CapHeight" => m.cap_height as i64,
                    "StemV" => 80,
                    "FontFile2" => file_id,
                });
                dictionary! {
                    "Type" => "Font",
                    "Subtype" => "TrueType",
                    "BaseFont" => ttf.name.as_str(),
                    "FirstChar" => FIRST_CHAR as i64,
                    "LastChar" => LAST_CHAR as i64,
                    "Widths" => m.widths.iter().map(|&w| Object::Integer(w as i64)).collect::<Vec<_>>(),
                    "FontDescriptor" => descriptor_id,
                    "Encoding" => "WinAnsiEncoding",
                }
            }
        };
        let font_id = self.doc.add_object(font_dict);
        Ok(self.register_resource(b"Font", "LsF", font_id))
    }

    /// Add `id` under a name not already used by the template
    fn register_resource(&mut self, category: &[u8], stem: &str, id: ObjectId) -> String {
        let mut entries = match self.resources.remove(category) {
            Some(Object::Dictionary(entries)) => entries,
            _ => Dictionary::new(),
        };
        let name = (1..)
            .map(|n| format!("{}{}", stem, n))
            .find(|name| !entries.has(name.as_bytes()))
            .unwrap_or_else(|| stem.to_string());
        entries.set(name.clone(), Object::Reference(id));
        self.resources
            .set(category.to_vec(), Object::Dictionary(entries));
        name
    }

    /// Append the buffered label content and serialize the document
    pub fn finish(mut self) -> Result<Vec<u8>, LabelSheetError> {
        // Template content runs inside q/Q so its graphics state cannot leak
        let mut operations = vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                reals(&[1.0, 0.0, 0.0, 1.0, self.origin.0, self.origin.1]),
            ),
        ];
        operations.append(&mut self.operations);
        operations.push(Operation::new("Q", vec![]));

        // Leading newline keeps the first operator apart from template content
        let mut content = b"\n".to_vec();
        content.extend(
            Content { operations }
                .encode()
                .map_err(|e| LabelSheetError::Pdf(format!("Failed to encode content: {}", e)))?,
        );
        let prologue_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let labels_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let existing = match self
            .doc
            .get_object(self.page_id)
            .and_then(Object::as_dict)?
            .get(b"Contents")
        {
            // A reference may point at a single stream or at an array of streams
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(streams)) => streams.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(streams)) => streams.clone(),
            _ => Vec::new(),
        };
        let mut contents = vec![Object::Reference(prologue_id)];
        contents.extend(existing);
        contents.push(Object::Reference(labels_id));

        let page = self
            .doc
            .get_object_mut(self.page_id)
            .and_then(Object::as_dict_mut)?;
        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(self.resources));

        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| LabelSheetError::Pdf(format!("Save failed: {}", e)))?;
        Ok(buffer)
    }
}

impl LabelSurface for PdfPage {
    fn page_size(&self) -> (f32, f32) {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", reals(&[color.r, color.g, color.b])),
            Operation::new("re", reals(&[rect.x, rect.y, rect.width, rect.height])),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", reals(&[color.r, color.g, color.b])),
            Operation::new("w", reals(&[line_width])),
            Operation::new("re", reals(&[rect.x, rect.y, rect.width, rect.height])),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn add_image(&mut self, raster: &Raster) -> Result<ImageRef, LabelSheetError> {
        if raster.is_empty() {
            return Err(LabelSheetError::Pdf("Cannot embed an empty image".into()));
        }
        let color_space = match raster.format() {
            PixelFormat::Gray => "DeviceGray",
            PixelFormat::Rgb | PixelFormat::Rgba => "DeviceRGB",
        };
        let (color, alpha) = raster.split_alpha();

        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => raster.width() as i64,
            "Height" => raster.height() as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        if let Some(alpha) = alpha {
            let smask_id = self.doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => raster.width() as i64,
                    "Height" => raster.height() as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                flate_compress(&alpha)?,
            ));
            image_dict.set("SMask", Object::Reference(smask_id));
        }

        let image_id = self
            .doc
            .add_object(Stream::new(image_dict, flate_compress(&color)?));
        let name = self.register_resource(b"XObject", "LsIm", image_id);
        Ok(ImageRef(name))
    }

    fn draw_image(&mut self, image: &ImageRef, placement: Placement) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("cm", reals(&placement.matrix())),
            Operation::new("Do", vec![Object::Name(image.0.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgb) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(self.font_resource.as_bytes().to_vec()),
                    Object::Real(size),
                ],
            ),
            Operation::new("rg", reals(&[color.r, color.g, color.b])),
            Operation::new("Td", reals(&[x, y])),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        self.font.text_width(text, size)
    }

    fn text_height(&self, size: f32) -> f32 {
        self.font.height_at_size(size)
    }
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|&v| Object::Real(v)).collect()
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>, LabelSheetError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| LabelSheetError::Pdf(format!("Compression failed: {}", e)))
}

/// Look up a page attribute, walking up the page tree for inherited keys
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Parse a box array [x1, y1, x2, y2]
fn parse_box(obj: &Object) -> Result<[f32; 4], LabelSheetError> {
    let array = obj
        .as_array()
        .map_err(|_| LabelSheetError::Asset("MediaBox is not an array".into()))?;
    if array.len() != 4 {
        return Err(LabelSheetError::Asset(
            "MediaBox must have 4 elements".into(),
        ));
    }

    let mut result = [0.0; 4];
    for (i, value) in array.iter().enumerate() {
        result[i] = match value {
            Object::Integer(n) => *n as f32,
            Object::Real(n) => *n,
            _ => {
                return Err(LabelSheetError::Asset(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }
    Ok(result)
}
