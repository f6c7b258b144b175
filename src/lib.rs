// kegel-pdf: PDF documents for a bowling club, drawn with a coordinate-cursor engine

pub mod attachment;
pub mod config;
pub mod error;
pub mod font;
pub mod model;
pub mod templates;
pub mod vpe;

pub use attachment::PdfAttachment;
pub use config::SheetConfig;
pub use error::{AppError, VpeError};
pub use vpe::{Align, Cursor, Margins, Orientation, PenStyle, Vpe};
