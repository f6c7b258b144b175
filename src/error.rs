// kegel-pdf: error types

use thiserror::Error;

/// Failures raised while drawing or serializing a document.
#[derive(Error, Debug)]
pub enum VpeError {
    #[error("PDF renderer failed: {0}")]
    Render(String),
    #[error("Invalid image data: {0}")]
    ImageData(String),
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] ::image::ImageError),
}

/// Failures of the command line front end.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to create PDF: {0}")]
    Pdf(#[from] VpeError),
    #[error("Failed to read data file: {0}")]
    Data(String),
    #[error("Failed to read config file: {0}")]
    Config(String),
    #[error("Invalid date format: {0}")]
    Date(String),
    #[error("Failed to load logo: {0}")]
    Logo(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
