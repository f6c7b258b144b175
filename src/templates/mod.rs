// kegel-pdf: document layouts built from engine calls
//
// Every template starts a fresh engine, draws the letterhead, emits rows and
// returns the serialized document. Rows are chained through `cursor.bottom`.

pub mod bracket;
pub mod member_list;
pub mod score_sheet;
pub mod settlement;

use ::image::ImageFormat;
use base64::Engine as _;
use chrono::NaiveDate;
use tracing::debug;

use crate::config::SheetConfig;
use crate::error::VpeError;
use crate::vpe::{Align, Orientation, Vpe};

/// Inner horizontal padding of table cells
const CELL_PAD: f32 = 0.1;

/// Stroke width of table rules and boxes, in centimeters
pub(crate) const HAIRLINE: f32 = 0.02;

const LOGO_HEIGHT: f32 = 1.6;
const LOGO_MAX_WIDTH: f32 = 5.0;

// ============================================================================
// Letterhead
// ============================================================================

/// Club logo prepared for embedding.
#[derive(Debug, Clone)]
pub struct Logo {
    data_uri: String,
    format: &'static str,
    aspect: f32,
}

impl Logo {
    /// Validate raw image bytes and encode them as a data URI.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VpeError> {
        let format = ::image::guess_format(bytes)?;
        let img = ::image::load_from_memory_with_format(bytes, format)?;
        if img.width() == 0 || img.height() == 0 {
            return Err(VpeError::ImageData("empty image".to_string()));
        }
        let token = match format {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::WebP => "WEBP",
            other => {
                return Err(VpeError::ImageData(format!(
                    "unsupported image format {:?}",
                    other
                )))
            }
        };
        Ok(Self {
            data_uri: format!(
                "data:image/{};base64,{}",
                token.to_lowercase(),
                base64::engine::general_purpose::STANDARD.encode(bytes)
            ),
            format: token,
            aspect: img.width() as f32 / img.height() as f32,
        })
    }
}

/// What goes on top of every document.
pub struct Letterhead<'a> {
    pub config: &'a SheetConfig,
    pub logo: Option<&'a Logo>,
    /// Shown as "Stand" date
    pub printed: NaiveDate,
}

pub(crate) fn start_document(
    title: &str,
    orientation: Orientation,
    config: &SheetConfig,
) -> Result<Vpe, VpeError> {
    let mut vpe = Vpe::new(title, orientation)?;
    vpe.pen_size = HAIRLINE;
    let m = config.margins;
    vpe.set_margins(m.left, m.top, m.right, m.bottom);
    vpe.select_font(&config.font_family, config.font_size)?;
    vpe.set_font_attr(Align::Left, false, false, false, false)?;
    Ok(vpe)
}

/// Club name, document title and subtitle on the left, logo on the right,
/// separated from the body by a rule.
pub(crate) fn draw_letterhead(
    vpe: &mut Vpe,
    head: &Letterhead,
    title: &str,
    subtitle: &str,
) -> Result<(), VpeError> {
    let config = head.config;
    let left = vpe.margins().left;
    let right = vpe.right_limit();
    let top = vpe.cursor.bottom;

    let mut logo_bottom = top;
    let mut text_width = right - left;
    if let Some(logo) = head.logo {
        let logo_width = (LOGO_HEIGHT * logo.aspect).min(LOGO_MAX_WIDTH);
        let cursor = vpe.image(
            right - logo_width,
            top,
            -logo_width,
            -LOGO_HEIGHT,
            &logo.data_uri,
            logo.format,
        )?;
        logo_bottom = cursor.bottom;
        text_width -= logo_width + 0.5;
    }

    vpe.select_font(&config.font_family, config.font_size + 4.0)?;
    vpe.set_font_attr(Align::Left, true, false, false, false)?;
    vpe.write(left, top, -text_width, -0.8, &config.club);

    vpe.select_font(&config.font_family, config.font_size + 2.0)?;
    vpe.write(left, vpe.cursor.bottom, -text_width, -0.7, title);

    vpe.select_font(&config.font_family, config.font_size)?;
    vpe.set_font_attr(Align::Left, false, false, false, false)?;
    let row = vpe.cursor.bottom;
    vpe.write(left, row, -text_width, -0.5, subtitle);

    vpe.set_font_attr(Align::Right, false, true, false, false)?;
    let stamp = format!("Stand: {}", format_date(head.printed));
    vpe.write(left, row, -text_width, -0.5, &stamp);
    vpe.set_font_attr(Align::Left, false, false, false, false)?;

    let rule = vpe.cursor.bottom.max(logo_bottom) + 0.2;
    vpe.line(left, rule, right, rule);
    Ok(())
}

/// Short heading for follow-up pages.
pub(crate) fn draw_continuation(
    vpe: &mut Vpe,
    head: &Letterhead,
    title: &str,
) -> Result<(), VpeError> {
    let left = vpe.margins().left;
    let width = vpe.right_limit() - left;
    vpe.set_font_attr(Align::Left, false, true, false, false)?;
    let text = format!("{} - {} (Fortsetzung)", head.config.club, title);
    vpe.write(left, vpe.cursor.bottom, -width, -0.6, &text);
    vpe.set_font_attr(Align::Left, false, false, false, false)?;
    vpe.cursor.bottom += 0.2;
    Ok(())
}

// ============================================================================
// Pagination
// ============================================================================

/// Break the page when `height` more centimeters would cross the bottom
/// limit, then let `redraw` repeat the page header. Returns whether a break
/// happened.
pub fn ensure_room<F>(vpe: &mut Vpe, height: f32, mut redraw: F) -> Result<bool, VpeError>
where
    F: FnMut(&mut Vpe) -> Result<(), VpeError>,
{
    if vpe.cursor.bottom + height <= vpe.bottom_limit() {
        return Ok(false);
    }
    vpe.page_break();
    redraw(vpe)?;
    debug!(page = vpe.page_count(), "continued on new page");
    Ok(true)
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub title: &'static str,
    pub width: f32,
    pub align: Align,
}

impl Column {
    pub const fn new(title: &'static str, width: f32, align: Align) -> Self {
        Self {
            title,
            width,
            align,
        }
    }
}

/// Scale column widths so they fill `width`.
pub fn fit_columns(columns: &[Column], width: f32) -> Vec<Column> {
    let total: f32 = columns.iter().map(|c| c.width).sum();
    if total <= 0.0 {
        return columns.to_vec();
    }
    columns
        .iter()
        .map(|c| Column {
            width: c.width * width / total,
            ..*c
        })
        .collect()
}

/// Boxed, bold, centered column titles starting at the left margin.
pub(crate) fn header_row(vpe: &mut Vpe, columns: &[Column], height: f32) -> Result<(), VpeError> {
    let y = vpe.cursor.bottom;
    let mut x = vpe.margins().left;
    vpe.set_font_attr(Align::Center, true, false, false, false)?;
    for column in columns {
        vpe.write_box(x, y, -column.width, -height, column.title);
        x += column.width;
    }
    vpe.set_font_attr(Align::Left, false, false, false, false)?;
    Ok(())
}

/// One boxed row; missing cells stay empty.
pub(crate) fn table_row(
    vpe: &mut Vpe,
    columns: &[Column],
    cells: &[String],
    height: f32,
    bold: bool,
) -> Result<(), VpeError> {
    let y = vpe.cursor.bottom;
    let mut x = vpe.margins().left;
    for (idx, column) in columns.iter().enumerate() {
        let text = cells.get(idx).map_or("", String::as_str);
        vpe.draw_box(x, y, -column.width, -height);
        vpe.set_font_attr(column.align, bold, false, false, false)?;
        vpe.write(
            x + CELL_PAD,
            y,
            -(column.width - 2.0 * CELL_PAD),
            -height,
            text,
        );
        x += column.width;
    }
    vpe.set_font_attr(Align::Left, false, false, false, false)?;
    Ok(())
}

// ============================================================================
// Formatting
// ============================================================================

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// German currency notation, e.g. `-1.234,50 €`.
pub fn format_euro(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let euros = (abs / 100).to_string();
    let mut grouped = String::with_capacity(euros.len() + euros.len() / 3);
    for (i, c) in euros.chars().enumerate() {
        if i > 0 && (euros.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{}{},{:02} €", sign, grouped, abs % 100)
}
