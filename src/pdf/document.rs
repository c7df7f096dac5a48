//! Loading, saving and inspecting PDF documents

use std::path::Path;
use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object, StringFormat};
use crate::error::{Error, Result};

/// Load a PDF from disk; a document without pages is accepted
///
/// Attachments and generated listings may legitimately be empty, in which
/// case they contribute no pages to an assembly.
pub fn read_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    Ok(Document::load(path)?)
}

/// Load a PDF from disk, rejecting documents without pages
pub fn load_document(path: &Path) -> Result<Document> {
    let doc = read_document(path)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(doc)
}

/// Compress and save a document
pub fn save_document(doc: &mut Document, path: &Path) -> Result<()> {
    doc.compress();
    doc.save(path)?;
    Ok(())
}

/// Format a timestamp as a PDF date string, e.g. `D:20241120093000+01'00'`
pub fn pdf_date(time: &DateTime<Local>) -> String {
    let offset = time.format("%z").to_string();
    let (hours, minutes) = offset.split_at(3);
    format!("D:{}{}'{}'", time.format("%Y%m%d%H%M%S"), hours, minutes)
}

/// Write an Info dictionary with producer, creation date and optional title
pub fn stamp_info(doc: &mut Document, title: Option<&str>) {
    let mut info = Dictionary::new();
    info.set(
        "Producer",
        Object::String(
            concat!("pdf-directory ", env!("CARGO_PKG_VERSION")).as_bytes().to_vec(),
            StringFormat::Literal,
        ),
    );
    info.set(
        "CreationDate",
        Object::String(pdf_date(&Local::now()).into_bytes(), StringFormat::Literal),
    );
    if let Some(title) = title {
        info.set(
            "Title",
            Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        );
    }

    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let doc = load_document(path)?;

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| info.as_reference().ok())
        .and_then(|id| doc.get_dictionary(id).ok());

    Ok(PdfMetadata {
        page_count: doc.get_pages().len(),
        title: info.and_then(|info| info_string(info, b"Title")),
        producer: info.and_then(|info| info_string(info, b"Producer")),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    Ok(read_document(path)?.get_pages().len())
}
