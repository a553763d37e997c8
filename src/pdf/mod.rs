//! PDF page layout and serialization

pub mod layout;
pub mod writer;

pub use layout::{GridLayout, Placement, Rect};
pub use writer::{EmbeddedImage, PdfDocument, PdfError, PdfPage, PlacedImage};
