// kegel-pdf: sheet configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::vpe::Margins;

/// Settings shared by every generated document. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub club: String,
    /// Page margins in centimeters
    pub margins: Margins,
    pub font_family: String,
    pub font_size: f32,
    /// Logo file path or http(s) URL
    pub logo: Option<String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            club: "Kegelgruppe".to_string(),
            margins: Margins {
                left: 1.5,
                top: 1.5,
                right: 1.5,
                bottom: 1.5,
            },
            font_family: "Arial".to_string(),
            font_size: 10.0,
            logo: None,
        }
    }
}

impl SheetConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Invalid JSON: {}", e)))
    }
}
