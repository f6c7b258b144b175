// kegel-pdf: wrapping a rendered document for download

/// A finished PDF together with the name it is offered under.
#[derive(Debug, Clone)]
pub struct PdfAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PdfAttachment {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: format!("{}.pdf", sanitize_filename(name)),
            bytes,
        }
    }

    /// `Content-Type` and `Content-Disposition` for an HTTP response.
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("Content-Type", "application/pdf".to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename={}", self.filename),
            ),
        ]
    }
}

/// Lowercase ASCII: umlauts spelled out, spaces to dashes, anything else
/// outside letters, digits and dashes dropped.
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        match c {
            'ä' => sanitized.push_str("ae"),
            'ö' => sanitized.push_str("oe"),
            'ü' => sanitized.push_str("ue"),
            'ß' => sanitized.push_str("ss"),
            ' ' => sanitized.push('-'),
            c if c.is_ascii_alphanumeric() || c == '-' => sanitized.push(c),
            _ => {}
        }
    }
    if sanitized.is_empty() {
        "document".to_string()
    } else {
        sanitized
    }
}
