//! Drawing paginated blocks onto PDF pages
//!
//! Every capacity unit maps to one row slot of equal height, so a page
//! drawn here looks exactly as full as the paginator measured it. Text is
//! set in the standard Helvetica faces with WinAnsi encoding; nothing is
//! embedded.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use log::debug;
use crate::block::{Block, BlockKind, PaginationConfig};
use crate::error::Result;
use crate::paginate::Page;
use super::document::stamp_info;

/// Options for drawing pages
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Page width in points
    pub page_width: f32,
    /// Page height in points
    pub page_height: f32,
    /// Margin on all sides in points
    pub margin: f32,
    /// Body text size in points
    pub font_size: f32,
    /// Group header text size in points
    pub group_font_size: f32,
    /// Text appended to a group title on continuation notes
    pub continued_label: String,
    /// Whether to print "n / total" in the bottom margin
    pub page_numbers: bool,
    /// Document title for the Info dictionary
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        // 1920x1080 px at 96 dpi
        Self {
            page_width: 1440.0,
            page_height: 810.0,
            margin: 36.0,
            font_size: 16.0,
            group_font_size: 20.0,
            continued_label: "(continued)".to_string(),
            page_numbers: true,
            title: None,
        }
    }
}

/// Standard font resources shared by every page
const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const ITALIC: &str = "F3";

/// Render pages into a new PDF document, one PDF page per paginated page
pub fn render_pages(
    pages: &[Page],
    config: &PaginationConfig,
    options: &RenderOptions,
) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = add_font_resources(&mut doc);

    let mut page_ids = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let content = PageCanvas::new(options, config, page).draw(page, i + 1, pages.len());
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(options.page_width),
                Object::Real(options.page_height),
            ]),
        );
        page_dict.set("Resources", Object::Reference(resources_id));
        page_dict.set("Contents", Object::Reference(content_id));

        page_ids.push(doc.add_object(Object::Dictionary(page_dict)));
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_object));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    stamp_info(&mut doc, options.title.as_deref());

    debug!("Rendered {} pages", page_ids.len());
    Ok(doc)
}

fn add_font_resources(doc: &mut Document) -> ObjectId {
    let mut fonts = Dictionary::new();
    for (name, base_font) in [
        (REGULAR, "Helvetica"),
        (BOLD, "Helvetica-Bold"),
        (ITALIC, "Helvetica-Oblique"),
    ] {
        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = doc.add_object(Object::Dictionary(font));
        fonts.set(name, Object::Reference(font_id));
    }

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    doc.add_object(Object::Dictionary(resources))
}

/// Content stream builder for one page
struct PageCanvas<'a> {
    options: &'a RenderOptions,
    config: &'a PaginationConfig,
    slot_height: f32,
    /// Top of the next free slot
    cursor: f32,
    content: Vec<u8>,
}

impl<'a> PageCanvas<'a> {
    fn new(options: &'a RenderOptions, config: &'a PaginationConfig, page: &Page) -> Self {
        // Overflowing pages are squeezed so the oversized block stays on the page
        let slots = config.rows_per_page.max(page.used()).max(1);
        let usable = options.page_height - 2.0 * options.margin;
        Self {
            options,
            config,
            slot_height: usable / slots as f32,
            cursor: options.page_height - options.margin,
            content: Vec::new(),
        }
    }

    fn content_width(&self) -> f32 {
        self.options.page_width - 2.0 * self.options.margin
    }

    fn draw(mut self, page: &Page, number: usize, total: usize) -> Vec<u8> {
        let mut previous: Option<&Block> = None;
        for block in page.blocks() {
            if let Some(previous) = previous {
                if previous.group != block.group {
                    self.cursor -= self.config.section_spacing_units as f32 * self.slot_height;
                }
            }
            let height = block.cost(self.config) as f32 * self.slot_height;
            self.draw_block(block, height);
            self.cursor -= height;
            previous = Some(block);
        }

        if self.options.page_numbers {
            let label = format!("{} / {}", number, total);
            let size = self.options.font_size * 0.75;
            let x = self.options.page_width - self.options.margin - estimate_text_width(&label, size);
            let y = self.options.margin / 2.0;
            self.text(REGULAR, size, x, y, &label);
        }

        self.content
    }

    fn draw_block(&mut self, block: &Block, height: f32) {
        let size = self.options.font_size;
        match block.kind {
            BlockKind::GroupHeader => {
                self.fill_band(height, 0.85);
                let title = block.content.join(" ");
                let size = self.options.group_font_size;
                self.text(BOLD, size, self.options.margin + 6.0, self.baseline(height, size), &title);
            }
            BlockKind::TableHeader => {
                self.fill_band(height, 0.93);
                self.columns(BOLD, size, height, &block.content);
                self.rule(self.cursor - height, 1.0);
            }
            BlockKind::DataRow => {
                self.columns(REGULAR, size, height, &block.content);
                self.rule(self.cursor - height, 0.25);
            }
            BlockKind::ContinuationNote => {
                let mut note = block.content.join(" ");
                if !note.is_empty() {
                    note.push(' ');
                }
                note.push_str(&self.options.continued_label);
                self.text(ITALIC, size, self.options.margin + 6.0, self.baseline(height, size), &note);
            }
        }
    }

    /// Baseline that vertically centers text of `size` in a band of `height` below the cursor
    fn baseline(&self, height: f32, size: f32) -> f32 {
        self.cursor - height / 2.0 - size * 0.35
    }

    fn columns(&mut self, font: &str, size: f32, height: f32, cells: &[String]) {
        if cells.is_empty() {
            return;
        }
        let width = self.content_width() / cells.len() as f32;
        let y = self.baseline(height, size);
        for (i, cell) in cells.iter().enumerate() {
            let x = self.options.margin + i as f32 * width + 6.0;
            let text = fit_text(cell, size, width - 12.0);
            self.text(font, size, x, y, &text);
        }
    }

    fn fill_band(&mut self, height: f32, gray: f32) {
        let op = format!(
            "q\n{} g\n{} {} {} {} re\nf\nQ\n",
            gray,
            self.options.margin,
            self.cursor - height,
            self.content_width(),
            height
        );
        self.content.extend_from_slice(op.as_bytes());
    }

    fn rule(&mut self, y: f32, line_width: f32) {
        let op = format!(
            "q\n0.6 G\n{} w\n{} {} m\n{} {} l\nS\nQ\n",
            line_width,
            self.options.margin,
            y,
            self.options.page_width - self.options.margin,
            y
        );
        self.content.extend_from_slice(op.as_bytes());
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        let op = format!("BT\n0 g\n/{} {} Tf\n1 0 0 1 {} {} Tm\n(", font, size, x, y);
        self.content.extend_from_slice(op.as_bytes());
        self.content.extend(escape_pdf_bytes(&encode_win_ansi(text)));
        self.content.extend_from_slice(b") Tj\nET\n");
    }
}

/// Map text to single-byte WinAnsi codes; characters outside Latin-1 become `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x20AC => 0x80,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2022 => 0x95,
            0x2026 => 0x85,
            _ => b'?',
        })
        .collect()
}

/// Escape special characters in a PDF literal string
fn escape_pdf_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'\\' | b'(' | b')') {
            escaped.push(b'\\');
        }
        escaped.push(b);
    }
    escaped
}

/// Estimate text width for Helvetica
fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// Truncate text with an ellipsis so it fits `max_width`
fn fit_text(text: &str, font_size: f32, max_width: f32) -> String {
    if estimate_text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let max_chars = (max_width / (font_size * 0.5)).floor() as usize;
    if max_chars == 0 {
        return String::new();
    }
    let mut fitted: String = text.chars().take(max_chars - 1).collect();
    fitted.push('\u{2026}');
    fitted
}
