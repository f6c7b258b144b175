// kegel-pdf: base-14 font selection and text measurement

use printpdf::BuiltinFont;

// ============================================================================
// Font Selection
// ============================================================================

/// Base-14 font families the engine can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Resolve a family name case-insensitively. Unknown names fall back to Helvetica.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "times" | "times new roman" | "times-roman" | "roman" | "serif" => FontFamily::Times,
            "courier" | "courier new" | "mono" | "monospace" => FontFamily::Courier,
            // "arial", "helvetica", "sans", "swiss" and anything unknown
            _ => FontFamily::Helvetica,
        }
    }
}

/// Weight/slant combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => FontStyle::BoldItalic,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (false, false) => FontStyle::Normal,
        }
    }

    /// Style token: "normal", "bold", "italic" or "bolditalic".
    pub fn token(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
            FontStyle::BoldItalic => "bolditalic",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }
}

pub fn builtin_font(family: FontFamily, style: FontStyle) -> BuiltinFont {
    match (family, style) {
        (FontFamily::Helvetica, FontStyle::Normal) => BuiltinFont::Helvetica,
        (FontFamily::Helvetica, FontStyle::Bold) => BuiltinFont::HelveticaBold,
        (FontFamily::Helvetica, FontStyle::Italic) => BuiltinFont::HelveticaOblique,
        (FontFamily::Helvetica, FontStyle::BoldItalic) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Times, FontStyle::Normal) => BuiltinFont::TimesRoman,
        (FontFamily::Times, FontStyle::Bold) => BuiltinFont::TimesBold,
        (FontFamily::Times, FontStyle::Italic) => BuiltinFont::TimesItalic,
        (FontFamily::Times, FontStyle::BoldItalic) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Courier, FontStyle::Normal) => BuiltinFont::Courier,
        (FontFamily::Courier, FontStyle::Bold) => BuiltinFont::CourierBold,
        (FontFamily::Courier, FontStyle::Italic) => BuiltinFont::CourierOblique,
        (FontFamily::Courier, FontStyle::BoldItalic) => BuiltinFont::CourierBoldOblique,
    }
}

// ============================================================================
// Glyph Widths
// ============================================================================

/// Advance widths in 1/1000 em for ' ' (0x20) through '~' (0x7E), from the Adobe AFM files.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, 611, 778, 722,
    556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, 556, 556, 444,
    389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

const COURIER_WIDTH: u16 = 600;

/// Points to centimeters.
pub const PT_TO_CM: f32 = 2.54 / 72.0;

fn width_table(family: FontFamily, style: FontStyle) -> Option<&'static [u16; 95]> {
    // Oblique and italic cuts are measured with their upright widths.
    match family {
        FontFamily::Helvetica if style.is_bold() => Some(&HELVETICA_BOLD_WIDTHS),
        FontFamily::Helvetica => Some(&HELVETICA_WIDTHS),
        FontFamily::Times if style.is_bold() => Some(&TIMES_BOLD_WIDTHS),
        FontFamily::Times => Some(&TIMES_WIDTHS),
        FontFamily::Courier => None,
    }
}

fn base_letter(c: char) -> char {
    match c {
        'ä' | 'à' | 'á' | 'â' => 'a',
        'ö' | 'ò' | 'ó' | 'ô' => 'o',
        'ü' | 'ù' | 'ú' | 'û' => 'u',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'Ä' => 'A',
        'Ö' => 'O',
        'Ü' => 'U',
        _ => c,
    }
}

/// Advance width of one character in 1/1000 em.
pub fn char_width(family: FontFamily, style: FontStyle, c: char) -> u16 {
    let Some(table) = width_table(family, style) else {
        return COURIER_WIDTH;
    };
    let lookup = |c: char| table[(c as u32 - 0x20) as usize];
    match base_letter(c) {
        'ß' => match (family, style.is_bold()) {
            (FontFamily::Times, false) => 500,
            (FontFamily::Times, true) => 556,
            _ => 611,
        },
        b @ ' '..='~' => lookup(b),
        _ => lookup('o'),
    }
}

/// Rendered width of `text` in points at `size_pt`.
pub fn text_width_pt(family: FontFamily, style: FontStyle, text: &str, size_pt: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(char_width(family, style, c)))
        .sum();
    units as f32 * size_pt / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_family_aliases() {
        assert_eq!(FontFamily::from_name("Arial"), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name("ARIAL"), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name("Times New Roman"), FontFamily::Times);
        assert_eq!(FontFamily::from_name("courier new"), FontFamily::Courier);
        assert_eq!(FontFamily::from_name("Wingdings"), FontFamily::Helvetica);
    }

    #[test]
    fn test_style_tokens() {
        assert_eq!(FontStyle::from_flags(true, true).token(), "bolditalic");
        assert_eq!(FontStyle::from_flags(true, false).token(), "bold");
        assert_eq!(FontStyle::from_flags(false, true).token(), "italic");
        assert_eq!(FontStyle::from_flags(false, false).token(), "normal");
    }

    #[test]
    fn test_helvetica_widths() {
        assert_eq!(char_width(FontFamily::Helvetica, FontStyle::Normal, 'A'), 667);
        assert_eq!(char_width(FontFamily::Helvetica, FontStyle::Normal, 'i'), 222);
        assert_eq!(char_width(FontFamily::Helvetica, FontStyle::Bold, 'i'), 278);
        assert_eq!(char_width(FontFamily::Helvetica, FontStyle::Italic, 'm'), 833);
    }

    #[test]
    fn test_umlauts_measure_like_base_letters() {
        let f = FontFamily::Helvetica;
        let s = FontStyle::Normal;
        assert_eq!(char_width(f, s, 'ä'), char_width(f, s, 'a'));
        assert_eq!(char_width(f, s, 'Ö'), char_width(f, s, 'O'));
        assert_eq!(char_width(f, s, 'ß'), 611);
    }

    #[test]
    fn test_courier_is_fixed_pitch() {
        let w = text_width_pt(FontFamily::Courier, FontStyle::Bold, "iiWW", 10.0);
        assert!((w - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let at_10 = text_width_pt(FontFamily::Times, FontStyle::Normal, "Kegeln", 10.0);
        let at_20 = text_width_pt(FontFamily::Times, FontStyle::Normal, "Kegeln", 20.0);
        assert!((at_20 - 2.0 * at_10).abs() < 1e-4);
        assert_eq!(text_width_pt(FontFamily::Times, FontStyle::Normal, "", 10.0), 0.0);
    }
}
