//! PDF rendering and assembly

pub mod assemble;
pub mod document;
pub mod render;

// Re-export commonly used items
pub use assemble::{assemble_files, merge_documents};
pub use document::{count_pages, extract_metadata, load_document, read_document, save_document, PdfMetadata};
pub use render::{render_pages, RenderOptions};
