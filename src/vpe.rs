// kegel-pdf: coordinate-cursor drawing engine on top of printpdf
//
// All public coordinates are centimeters from the top-left page corner. Every
// drawing call records the bounding box of what it drew in `cursor`, so the
// next call can be placed relative to the previous call's right or bottom edge.

use std::collections::HashMap;

use ::image::{imageops, DynamicImage, ImageFormat, Rgba, RgbImage, RgbaImage};
use base64::Engine as _;
use printpdf::{
    Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Line,
    LineDashPattern, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Px, Rgb,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::VpeError;
use crate::font::{self, FontFamily, FontStyle, PT_TO_CM};

// ============================================================================
// Constants
// ============================================================================

/// DIN A4 in centimeters (portrait)
const A4_WIDTH_CM: f32 = 21.0;
const A4_HEIGHT_CM: f32 = 29.7;

/// Fixed scale between the public unit and the renderer unit
const MM_PER_CM: f32 = 10.0;

const MM_PER_INCH: f32 = 25.4;
const PT_PER_MM: f32 = 72.0 / MM_PER_INCH;

/// Cap height as a fraction of the font size, used to center text vertically
const CAP_HEIGHT_RATIO: f32 = 0.7;

pub const DEFAULT_PEN_SIZE: f32 = 0.2;
const DEFAULT_FONT_SIZE: f32 = 10.0;

const LAYER_NAME: &str = "Layer 1";

// ============================================================================
// Drawing State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Dash pattern applied to lines and boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenStyle {
    #[default]
    Solid,
    Dash,
    DashDot,
    DashDotDot,
}

impl PenStyle {
    /// Renderer dash pattern, lengths in points.
    fn dash_pattern(self) -> LineDashPattern {
        const DASH: i64 = 9;
        const GAP: i64 = 6;
        const DOT: i64 = 2;
        const DOT_GAP: i64 = 4;
        match self {
            PenStyle::Solid => LineDashPattern::default(),
            PenStyle::Dash => LineDashPattern {
                dash_1: Some(DASH),
                gap_1: Some(GAP),
                ..Default::default()
            },
            PenStyle::DashDot => LineDashPattern {
                dash_1: Some(DASH),
                gap_1: Some(DOT_GAP),
                dash_2: Some(DOT),
                gap_2: Some(DOT_GAP),
                ..Default::default()
            },
            PenStyle::DashDotDot => LineDashPattern {
                dash_1: Some(DASH),
                gap_1: Some(DOT_GAP),
                dash_2: Some(DOT),
                gap_2: Some(DOT_GAP),
                dash_3: Some(DOT),
                gap_3: Some(DOT_GAP),
                ..Default::default()
            },
        }
    }
}

/// Bounding box of the most recent drawing call, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

// ============================================================================
// Engine
// ============================================================================

/// One engine per generated document.
pub struct Vpe {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    page_count: usize,
    page_width: f32,
    page_height: f32,
    margins: Margins,
    right_limit: f32,
    bottom_limit: f32,

    /// Edges of the last drawn element; read these to chain the next call.
    pub cursor: Cursor,
    saved: Cursor,

    /// Line width in centimeters.
    pub pen_size: f32,
    pub pen_style: PenStyle,

    font_family: FontFamily,
    font_style: FontStyle,
    font_size: f32,
    align: Align,
    font: IndirectFontRef,
    fonts: HashMap<(FontFamily, FontStyle), IndirectFontRef>,
}

impl Vpe {
    /// Start a new A4 document with one empty page.
    pub fn new(title: &str, orientation: Orientation) -> Result<Self, VpeError> {
        let (page_width, page_height) = match orientation {
            Orientation::Portrait => (A4_WIDTH_CM, A4_HEIGHT_CM),
            Orientation::Landscape => (A4_HEIGHT_CM, A4_WIDTH_CM),
        };

        let (doc, page1, layer1) = PdfDocument::new(
            title,
            Mm(page_width * MM_PER_CM),
            Mm(page_height * MM_PER_CM),
            LAYER_NAME,
        );
        let layer = doc.get_page(page1).get_layer(layer1);

        let font_family = FontFamily::Helvetica;
        let font_style = FontStyle::Normal;
        let font = doc
            .add_builtin_font(font::builtin_font(font_family, font_style))
            .map_err(|e| VpeError::Render(e.to_string()))?;
        let mut fonts = HashMap::new();
        fonts.insert((font_family, font_style), font.clone());

        debug!(?orientation, page_width, page_height, "created document");

        Ok(Self {
            doc,
            layer,
            page_count: 1,
            page_width,
            page_height,
            margins: Margins::default(),
            right_limit: page_width,
            bottom_limit: page_height,
            cursor: Cursor::default(),
            saved: Cursor::default(),
            pen_size: DEFAULT_PEN_SIZE,
            pen_style: PenStyle::Solid,
            font_family,
            font_style,
            font_size: DEFAULT_FONT_SIZE,
            align: Align::Left,
            font,
            fonts,
        })
    }

    // ------------------------------------------------------------------------
    // Page setup
    // ------------------------------------------------------------------------

    pub fn set_margins(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        self.margins = Margins {
            left,
            top,
            right,
            bottom,
        };
        self.right_limit = self.page_width - right;
        self.bottom_limit = self.page_height - bottom;
        self.cursor.bottom = top;
    }

    /// Append a page and move the cursor back up to the top margin.
    pub fn page_break(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.page_width * MM_PER_CM),
            Mm(self.page_height * MM_PER_CM),
            LAYER_NAME,
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_count += 1;
        self.cursor.bottom = self.margins.top;
        debug!(page = self.page_count, "page break");
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn right_limit(&self) -> f32 {
        self.right_limit
    }

    pub fn bottom_limit(&self) -> f32 {
        self.bottom_limit
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    // ------------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------------

    pub fn select_font(&mut self, family: &str, size_pt: f32) -> Result<(), VpeError> {
        self.font_family = FontFamily::from_name(family);
        self.font_size = size_pt;
        self.apply_font()
    }

    /// Underline and strikeout are accepted but not rendered.
    pub fn set_font_attr(
        &mut self,
        align: Align,
        bold: bool,
        italic: bool,
        underline: bool,
        strikeout: bool,
    ) -> Result<(), VpeError> {
        if underline || strikeout {
            trace!(underline, strikeout, "text decoration is not rendered");
        }
        self.align = align;
        self.font_style = FontStyle::from_flags(bold, italic);
        self.apply_font()
    }

    fn apply_font(&mut self) -> Result<(), VpeError> {
        let key = (self.font_family, self.font_style);
        if let Some(font) = self.fonts.get(&key) {
            self.font = font.clone();
            return Ok(());
        }
        let builtin = font::builtin_font(self.font_family, self.font_style);
        let font = self
            .doc
            .add_builtin_font(builtin)
            .map_err(|e| VpeError::Render(e.to_string()))?;
        debug!(?builtin, style = self.font_style.token(), "loaded font");
        self.fonts.insert(key, font.clone());
        self.font = font;
        Ok(())
    }

    /// Width of `text` in the active font, in centimeters.
    pub fn text_width(&self, text: &str) -> f32 {
        font::text_width_pt(self.font_family, self.font_style, text, self.font_size) * PT_TO_CM
    }

    // ------------------------------------------------------------------------
    // Drawing primitives
    // ------------------------------------------------------------------------

    /// Draw `text` aligned inside the box and vertically centered in it.
    /// The cursor's horizontal edges follow the measured text, not the box.
    pub fn write(&mut self, x: f32, y: f32, w: f32, h: f32, text: &str) -> Cursor {
        let (w, h) = (w.abs(), h.abs());
        let text_width = self.text_width(text);

        let (left, right) = match self.align {
            Align::Left => (x, x + text_width),
            Align::Center => {
                let mid = x + w / 2.0;
                (mid - text_width / 2.0, mid + text_width / 2.0)
            }
            Align::Right => (x + w - text_width, x + w),
        };

        if !text.is_empty() {
            let size_cm = self.font_size * PT_TO_CM;
            let baseline = y + (h + size_cm * CAP_HEIGHT_RATIO) / 2.0;
            self.layer.set_fill_color(black());
            self.layer.use_text(
                text,
                self.font_size,
                self.pdf_x(left),
                self.pdf_y(baseline),
                &self.font,
            );
        }

        self.cursor = Cursor {
            left,
            top: y,
            right,
            bottom: y + h,
        };
        self.cursor
    }

    /// Stroke a rectangle with the current pen.
    pub fn draw_box(&mut self, x: f32, y: f32, w: f32, h: f32) -> Cursor {
        let (w, h) = (w.abs(), h.abs());
        self.apply_pen();
        let points = vec![
            (Point::new(self.pdf_x(x), self.pdf_y(y)), false),
            (Point::new(self.pdf_x(x + w), self.pdf_y(y)), false),
            (Point::new(self.pdf_x(x + w), self.pdf_y(y + h)), false),
            (Point::new(self.pdf_x(x), self.pdf_y(y + h)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });

        self.cursor = Cursor {
            left: x,
            top: y,
            right: x + w,
            bottom: y + h,
        };
        self.cursor
    }

    /// Solid box with text on top. Ends with the text's cursor and
    /// overwrites the stored position.
    pub fn write_box(&mut self, x: f32, y: f32, w: f32, h: f32, text: &str) -> Cursor {
        self.store_pos();
        let pen_style = self.pen_style;
        self.pen_style = PenStyle::Solid;
        self.draw_box(x, y, w, h);
        self.pen_style = pen_style;
        self.restore_pos();
        self.write(x, y, w, h, text)
    }

    /// Stroke a segment. The cursor records the two end points as given.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Cursor {
        self.apply_pen();
        let points = vec![
            (Point::new(self.pdf_x(x1), self.pdf_y(y1)), false),
            (Point::new(self.pdf_x(x2), self.pdf_y(y2)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: false,
        });

        self.cursor = Cursor {
            left: x1,
            top: y1,
            right: x2,
            bottom: y2,
        };
        self.cursor
    }

    /// Place a raster image stretched to the box.
    ///
    /// `data` is either a `data:image/...;base64,` URI or a bare base64 payload;
    /// `format` names the encoding ("PNG", "JPEG", ...).
    pub fn image(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        data: &str,
        format: &str,
    ) -> Result<Cursor, VpeError> {
        let (w, h) = (w.abs(), h.abs());
        let bytes = decode_payload(data)?;
        let decoded = match image_format(format) {
            Some(fmt) => ::image::load_from_memory_with_format(&bytes, fmt)?,
            None => ::image::load_from_memory(&bytes)?,
        };
        let rgb_image = flatten_onto_white(&decoded);
        let (width_px, height_px) = rgb_image.dimensions();

        if width_px > 0 && height_px > 0 && w > 0.0 && h > 0.0 {
            let image = Image::from(ImageXObject {
                width: Px(width_px as usize),
                height: Px(height_px as usize),
                color_space: ColorSpace::Rgb,
                bits_per_component: ColorBits::Bit8,
                interpolate: true,
                image_data: rgb_image.into_raw(),
                image_filter: None,
                clipping_bbox: None,
                smask: None,
            });

            // DPI fixes the width; the vertical scale stretches to the box height.
            let width_mm = w * MM_PER_CM;
            let height_mm = h * MM_PER_CM;
            let dpi = width_px as f32 / (width_mm / MM_PER_INCH);
            let natural_height_mm = height_px as f32 / dpi * MM_PER_INCH;

            image.add_to_layer(
                self.layer.clone(),
                ImageTransform {
                    translate_x: Some(self.pdf_x(x)),
                    translate_y: Some(self.pdf_y(y + h)),
                    dpi: Some(dpi),
                    scale_y: Some(height_mm / natural_height_mm),
                    ..Default::default()
                },
            );
            debug!(width_px, height_px, w, h, "embedded image");
        }

        self.cursor = Cursor {
            left: x,
            top: y,
            right: x + w,
            bottom: y + h,
        };
        Ok(self.cursor)
    }

    pub fn store_pos(&mut self) {
        self.saved = self.cursor;
    }

    pub fn restore_pos(&mut self) {
        self.cursor = self.saved;
    }

    /// Serialize the finished document.
    pub fn get_output(self) -> Result<Vec<u8>, VpeError> {
        debug!(pages = self.page_count, "serializing document");
        self.doc
            .save_to_bytes()
            .map_err(|e| VpeError::Render(e.to_string()))
    }

    // ------------------------------------------------------------------------
    // Renderer helpers
    // ------------------------------------------------------------------------

    fn pdf_x(&self, x: f32) -> Mm {
        Mm(x * MM_PER_CM)
    }

    /// Renderer y grows upward from the bottom edge.
    fn pdf_y(&self, y: f32) -> Mm {
        Mm((self.page_height - y) * MM_PER_CM)
    }

    fn apply_pen(&self) {
        self.layer.set_outline_color(black());
        self.layer
            .set_outline_thickness(self.pen_size * MM_PER_CM * PT_PER_MM);
        self.layer.set_line_dash_pattern(self.pen_style.dash_pattern());
    }
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

// ============================================================================
// Image Helpers
// ============================================================================

fn decode_payload(data: &str) -> Result<Vec<u8>, VpeError> {
    let payload = match data.strip_prefix("data:") {
        Some(uri) => match uri.split_once(',') {
            Some((_, body)) => body,
            None => return Err(VpeError::ImageData("data URI without payload".to_string())),
        },
        None => data,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| VpeError::ImageData(e.to_string()))
}

fn image_format(format: &str) -> Option<ImageFormat> {
    match format.trim().to_uppercase().as_str() {
        "PNG" => Some(ImageFormat::Png),
        "JPEG" | "JPG" => Some(ImageFormat::Jpeg),
        "GIF" => Some(ImageFormat::Gif),
        "BMP" => Some(ImageFormat::Bmp),
        "WEBP" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Blend the image over an opaque white canvas and drop the alpha channel.
fn flatten_onto_white(source: &DynamicImage) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(source.width(), source.height(), Rgba([255; 4]));
    imageops::overlay(&mut canvas, &source.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor as IoCursor;

    fn engine(orientation: Orientation) -> Vpe {
        Vpe::new("test", orientation).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn assert_cursor_eq(a: Cursor, b: Cursor) {
        assert!(
            approx(a.left, b.left)
                && approx(a.top, b.top)
                && approx(a.right, b.right)
                && approx(a.bottom, b.bottom),
            "{:?} != {:?}",
            a,
            b
        );
    }

    /// Operands of every `w` operator in the serialized document.
    fn stroke_widths(pdf: &[u8]) -> Vec<f32> {
        let text = String::from_utf8_lossy(pdf);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        tokens
            .windows(2)
            .filter(|pair| pair[1] == "w")
            .filter_map(|pair| pair[0].parse().ok())
            .collect()
    }

    /// Dash arrays of every `d` operator, in drawing order.
    fn dash_arrays(pdf: &[u8]) -> Vec<Vec<i64>> {
        let text = String::from_utf8_lossy(pdf);
        let mut arrays = Vec::new();
        let mut rest = text.as_ref();
        while let Some(open) = rest.find('[') {
            let Some(close) = rest[open..].find(']') else {
                break;
            };
            let inner = &rest[open + 1..open + close];
            let after = &rest[open + close + 1..];
            let mut tail = after.split_whitespace();
            let is_dash = matches!(
                (tail.next(), tail.next()),
                (Some(phase), Some("d")) if phase.parse::<i64>().is_ok()
            );
            if is_dash {
                arrays.push(
                    inner
                        .split_whitespace()
                        .filter_map(|n| n.parse().ok())
                        .collect(),
                );
            }
            rest = after;
        }
        arrays
    }

    fn png_data_uri(width: u32, height: u32) -> String {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 10, 10, 128]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut IoCursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
        )
    }

    #[test]
    fn test_set_margins_reads_back() {
        let mut vpe = engine(Orientation::Landscape);
        vpe.set_margins(2.0, 2.0, 2.0, 2.0);

        assert_eq!(vpe.margins().top, 2.0);
        assert_eq!(vpe.cursor().bottom, 2.0);
        assert!(approx(vpe.right_limit(), 29.7 - 2.0));
        assert!(approx(vpe.bottom_limit(), 21.0 - 2.0));
    }

    #[test]
    fn test_orientation_swaps_page_size() {
        let portrait = engine(Orientation::Portrait);
        let landscape = engine(Orientation::Landscape);
        assert_eq!(portrait.page_width(), landscape.page_height());
        assert_eq!(portrait.page_height(), landscape.page_width());
    }

    #[test]
    fn test_box_cursor_uses_magnitude() {
        let mut vpe = engine(Orientation::Portrait);
        let cursor = vpe.draw_box(1.5, 3.0, -4.0, -0.8);
        assert_cursor_eq(
            cursor,
            Cursor {
                left: 1.5,
                top: 3.0,
                right: 5.5,
                bottom: 3.8,
            },
        );
        assert_cursor_eq(vpe.cursor(), cursor);
    }

    #[test]
    fn test_sign_of_extent_is_irrelevant() {
        let mut vpe = engine(Orientation::Portrait);

        let neg = vpe.draw_box(2.0, 2.0, -3.0, -1.0);
        let pos = vpe.draw_box(2.0, 2.0, 3.0, 1.0);
        assert_cursor_eq(neg, pos);

        for align in [Align::Left, Align::Center, Align::Right] {
            vpe.set_font_attr(align, false, false, false, false).unwrap();
            let neg = vpe.write(2.0, 2.0, -3.0, -1.0, "Volle");
            let pos = vpe.write(2.0, 2.0, 3.0, 1.0, "Volle");
            assert_cursor_eq(neg, pos);

            let neg = vpe.write_box(2.0, 2.0, -3.0, -1.0, "Volle");
            let pos = vpe.write_box(2.0, 2.0, 3.0, 1.0, "Volle");
            assert_cursor_eq(neg, pos);
        }
    }

    #[test]
    fn test_left_write_spans_measured_text() {
        let mut vpe = engine(Orientation::Portrait);
        vpe.select_font("Arial", 12.0).unwrap();
        let cursor = vpe.write(2.0, 5.0, -6.0, -1.0, "ABC");

        assert!(approx(cursor.right - cursor.left, vpe.text_width("ABC")));
        assert_eq!(cursor.left, 2.0);
        assert_eq!(cursor.top, 5.0);
        assert_eq!(cursor.bottom, 6.0);
    }

    #[test]
    fn test_center_and_right_write_edges() {
        let mut vpe = engine(Orientation::Portrait);
        let width = vpe.text_width("Gesamt");

        vpe.set_font_attr(Align::Center, false, false, false, false)
            .unwrap();
        let cursor = vpe.write(2.0, 1.0, -4.0, -1.0, "Gesamt");
        assert!(approx(cursor.left, 4.0 - width / 2.0));
        assert!(approx(cursor.right, 4.0 + width / 2.0));

        vpe.set_font_attr(Align::Right, false, false, false, false)
            .unwrap();
        let cursor = vpe.write(2.0, 1.0, -4.0, -1.0, "Gesamt");
        assert!(approx(cursor.left, 6.0 - width));
        assert!(approx(cursor.right, 6.0));
    }

    #[test]
    fn test_bold_text_is_wider() {
        let mut vpe = engine(Orientation::Portrait);
        let regular = vpe.text_width("Kegelgruppe");
        vpe.set_font_attr(Align::Left, true, false, false, false)
            .unwrap();
        assert!(vpe.text_width("Kegelgruppe") > regular);
    }

    #[test]
    fn test_store_then_restore_is_identity() {
        let mut vpe = engine(Orientation::Portrait);
        let before = vpe.draw_box(1.0, 2.0, -3.0, -4.0);
        vpe.store_pos();
        vpe.restore_pos();
        assert_eq!(vpe.cursor(), before);
    }

    #[test]
    fn test_restore_returns_to_stored_anchor() {
        let mut vpe = engine(Orientation::Portrait);
        let anchor = vpe.draw_box(1.0, 1.0, -2.0, -2.0);
        vpe.store_pos();
        vpe.line(0.0, 0.0, 10.0, 10.0);
        vpe.restore_pos();
        assert_eq!(vpe.cursor(), anchor);
    }

    #[test]
    fn test_write_box_ends_with_text_cursor() {
        let mut a = engine(Orientation::Portrait);
        let mut b = engine(Orientation::Portrait);
        for vpe in [&mut a, &mut b] {
            vpe.select_font("Arial", 10.0).unwrap();
            vpe.set_font_attr(Align::Center, true, false, false, false)
                .unwrap();
        }

        let boxed = a.write_box(3.0, 4.0, -2.0, -1.0, "Label");
        let plain = b.write(3.0, 4.0, -2.0, -1.0, "Label");
        assert_eq!(boxed, plain);
    }

    #[test]
    fn test_write_box_keeps_pen_style() {
        let mut vpe = engine(Orientation::Portrait);
        vpe.pen_style = PenStyle::DashDot;
        vpe.write_box(1.0, 1.0, -2.0, -1.0, "x");
        assert_eq!(vpe.pen_style, PenStyle::DashDot);
    }

    #[test]
    fn test_pen_size_is_in_centimeters() {
        let mut vpe = engine(Orientation::Portrait);
        vpe.draw_box(1.0, 1.0, -2.0, -2.0);
        vpe.pen_size = 0.02;
        vpe.line(1.0, 4.0, 5.0, 4.0);

        let widths = stroke_widths(&vpe.get_output().unwrap());
        assert_eq!(widths.len(), 2, "{:?}", widths);
        // 0.2 cm and 0.02 cm in points
        assert!((widths[0] - 5.669_291).abs() < 1e-3, "{:?}", widths);
        assert!((widths[1] - 0.566_929).abs() < 1e-3, "{:?}", widths);
    }

    #[test]
    fn test_dash_patterns_reach_the_page() {
        let mut vpe = engine(Orientation::Portrait);
        vpe.pen_style = PenStyle::Dash;
        vpe.line(1.0, 1.0, 5.0, 1.0);
        vpe.write_box(1.0, 2.0, -3.0, -1.0, "Bahn 1");
        vpe.pen_style = PenStyle::DashDot;
        vpe.line(1.0, 4.0, 5.0, 4.0);
        vpe.pen_style = PenStyle::DashDotDot;
        vpe.line(1.0, 5.0, 5.0, 5.0);

        let dashes = dash_arrays(&vpe.get_output().unwrap());
        assert_eq!(
            dashes,
            vec![
                vec![9, 6],
                vec![],
                vec![9, 4, 2, 4],
                vec![9, 4, 2, 4, 2, 4],
            ]
        );
    }

    #[test]
    fn test_line_cursor_records_end_points() {
        let mut vpe = engine(Orientation::Portrait);
        vpe.pen_style = PenStyle::Dash;
        let cursor = vpe.line(5.0, 3.0, 1.0, 7.0);
        assert_eq!(
            cursor,
            Cursor {
                left: 5.0,
                top: 3.0,
                right: 1.0,
                bottom: 7.0,
            }
        );
    }

    #[test]
    fn test_page_break_resets_bottom_and_counts_pages() {
        let mut vpe = engine(Orientation::Landscape);
        vpe.set_margins(1.5, 2.5, 1.5, 1.5);
        vpe.draw_box(1.5, 10.0, -5.0, -3.0);
        assert_eq!(vpe.page_count(), 1);

        vpe.page_break();
        assert_eq!(vpe.page_count(), 2);
        assert_eq!(vpe.cursor().bottom, 2.5);
    }

    #[test]
    fn test_image_behaves_like_box() {
        let mut vpe = engine(Orientation::Portrait);
        let data = png_data_uri(4, 2);
        let cursor = vpe.image(1.0, 1.0, -4.0, -2.0, &data, "PNG").unwrap();
        assert_cursor_eq(
            cursor,
            Cursor {
                left: 1.0,
                top: 1.0,
                right: 5.0,
                bottom: 3.0,
            },
        );
    }

    #[test]
    fn test_image_accepts_bare_base64_and_unknown_format() {
        let mut vpe = engine(Orientation::Portrait);
        let uri = png_data_uri(3, 3);
        let (_, bare) = uri.split_once(',').unwrap();
        assert!(vpe.image(1.0, 1.0, -1.0, -1.0, bare, "whatever").is_ok());
    }

    #[test]
    fn test_image_rejects_garbage() {
        let mut vpe = engine(Orientation::Portrait);
        let err = vpe.image(1.0, 1.0, -1.0, -1.0, "%%%not-base64", "PNG");
        assert!(matches!(err, Err(VpeError::ImageData(_))));

        let not_an_image =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b"hello");
        let err = vpe.image(1.0, 1.0, -1.0, -1.0, &not_an_image, "PNG");
        assert!(matches!(err, Err(VpeError::ImageDecode(_))));
    }

    #[test]
    fn test_flatten_composites_on_white() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_output_is_pdf() {
        let mut vpe = engine(Orientation::Portrait);
        vpe.set_margins(2.0, 2.0, 2.0, 2.0);
        vpe.write(2.0, 2.0, -10.0, -1.0, "Kegelgruppe");
        let bytes = vpe.get_output().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
