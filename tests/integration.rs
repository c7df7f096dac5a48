//! Integration tests for the directory library

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_directory::assemble::AssemblyPolicy;
use pdf_directory::block::{Block, BlockKind, PaginationConfig};
use pdf_directory::paginate::{paginate, PaginationSummary};
use pdf_directory::pdf::{assemble_files, count_pages, extract_metadata, load_document};
use pdf_directory::pipeline::{build_directory, build_document, BuildOptions};
use pdf_directory::sheet::{parse_sheet, SheetOptions};
use pdf_directory::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a PDF whose pages contain their own label, e.g. `(cover2) Tj`
fn write_labelled_pdf(dir: &Path, name: &str, prefix: &str, count: usize) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 0..count {
        let content = format!("BT /F1 12 Tf 72 72 Td ({}{}) Tj ET", prefix, i);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(count as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let path = dir.join(name);
    doc.save(&path).expect("Failed to write test PDF");
    path
}

/// Decoded content of every page, in page order
fn page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|id| {
            let content = doc.get_page_content(id).expect("Failed to read page content");
            String::from_utf8_lossy(&content).to_string()
        })
        .collect()
}

/// A directory sheet with `groups` groups of `rows` rows each
fn directory_csv(groups: usize, rows: usize) -> String {
    let mut csv = String::from("Specialty,Name,Phone,City\n");
    for g in 0..groups {
        for r in 0..rows {
            csv.push_str(&format!("Specialty {},Doctor {}-{},555-{:04},City {}\n", g, g, r, r, g));
        }
    }
    csv
}

#[test]
fn test_table_header_with_twenty_rows() {
    let group = Some("staff".to_string());
    let mut blocks = vec![Block::table_header(group.clone(), vec!["Name".into()])];
    for i in 0..20 {
        blocks.push(Block::data_row(group.clone(), vec![format!("Row {}", i)]));
    }

    let config = PaginationConfig {
        rows_per_page: 14,
        group_header_units: 1,
        table_header_units: 1,
        continued_note_units: 1,
        section_spacing_units: 0,
    };
    let pages = paginate(&blocks, &config).expect("Pagination failed");

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].len(), 14);
    assert_eq!(pages[0].used(), 14);
    assert_eq!(pages[1].blocks()[0].kind, BlockKind::ContinuationNote);
    assert_eq!(pages[1].len(), 8);
    assert_eq!(pages[1].used(), 8);
}

#[test]
fn test_oversized_block_alone() {
    let blocks = vec![Block::data_row(None, vec!["tall".into()]).with_units(20)];
    let pages = paginate(&blocks, &PaginationConfig::with_rows_per_page(14)).expect("Pagination failed");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].blocks(), blocks.as_slice());
}

#[test]
fn test_block_pushed_over_capacity_by_note_goes_alone() {
    let group = Some("staff".to_string());
    let blocks = vec![
        Block::data_row(group.clone(), vec!["first".into()]),
        Block::data_row(group.clone(), vec!["wide".into()]).with_units(4),
        Block::data_row(group.clone(), vec!["last".into()]),
    ];
    let config = PaginationConfig {
        continued_note_units: 2,
        ..PaginationConfig::with_rows_per_page(4)
    };

    let pages = paginate(&blocks, &config).expect("Pagination failed");

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1].blocks(), &blocks[1..2]);
    for page in &pages[..pages.len() - 1] {
        assert!(
            page.len() == 1 || !page.is_overflowing(&config),
            "page with {} blocks uses {} units",
            page.len(),
            page.used()
        );
    }
    assert_eq!(pages[2].blocks()[0].kind, BlockKind::ContinuationNote);
}

#[test]
fn test_note_and_section_spacing_share_a_page() {
    let blocks = parse_sheet(directory_csv(2, 14).as_bytes(), &SheetOptions::default())
        .expect("Failed to parse sheet");
    let config = PaginationConfig {
        section_spacing_units: 1,
        ..PaginationConfig::default()
    };

    let pages = paginate(&blocks, &config).expect("Pagination failed");

    // Page 2: note + 2 rows of group 0, then spacing and the headers of group 1
    let second = &pages[1];
    assert_eq!(second.blocks()[0].kind, BlockKind::ContinuationNote);
    assert_eq!(second.blocks()[0].group.as_deref(), Some("Specialty 0"));
    assert_eq!(second.blocks()[3].kind, BlockKind::GroupHeader);
    let block_units: u32 = second.blocks().iter().map(|b| b.cost(&config)).sum();
    assert_eq!(second.used(), block_units + 1);
    assert!(second.used() <= config.rows_per_page);
}

#[test]
fn test_sheet_pagination_properties() {
    let blocks = parse_sheet(directory_csv(5, 17).as_bytes(), &SheetOptions::default())
        .expect("Failed to parse sheet");
    let config = PaginationConfig {
        section_spacing_units: 1,
        ..PaginationConfig::default()
    };

    let pages = paginate(&blocks, &config).expect("Pagination failed");
    let summary = PaginationSummary::of(&pages, &config);

    // Capacity
    for page in &pages {
        assert!(page.used() <= config.rows_per_page, "page over capacity: {}", page.used());
    }

    // Conservation and order
    assert_eq!(summary.blocks, blocks.len() + summary.continuation_notes);
    let placed: Vec<&Block> = pages
        .iter()
        .flat_map(|p| p.blocks())
        .filter(|b| b.kind != BlockKind::ContinuationNote)
        .collect();
    assert_eq!(placed, blocks.iter().collect::<Vec<_>>());

    // Every page after the first that starts mid-group opens with a note
    for pair in pages.windows(2) {
        let last = pair[0].blocks().last().unwrap();
        let first = &pair[1].blocks()[0];
        if first.kind == BlockKind::DataRow && first.group == last.group {
            panic!("group {:?} continued without a note", first.group);
        }
    }

    // Determinism
    assert_eq!(paginate(&blocks, &config).unwrap(), pages);
}

#[test]
fn test_build_directory_wraps_generated_pages() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let sheet_path = temp_dir.path().join("directory.csv");
    std::fs::write(&sheet_path, directory_csv(2, 20)).expect("Failed to write sheet");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "cover", 5);
    let output_path = temp_dir.path().join("directory.pdf");

    let report = build_directory(&sheet_path, &attach_path, &output_path, &BuildOptions::default())
        .expect("Failed to build directory");

    // 2 groups of 2 headers + 20 rows, 14 units per page
    assert_eq!(report.pagination.pages, 4);
    assert_eq!(report.attachment_pages, 5);
    assert_eq!(report.output_pages, 2 + 4 + 1);
    assert_eq!(count_pages(&output_path).unwrap(), report.output_pages);

    let merged = load_document(&output_path).expect("Failed to load output");
    let texts = page_texts(&merged);
    assert!(texts[0].contains("(cover0)"));
    assert!(texts[1].contains("(cover1)"));
    assert!(texts[2].contains("(Specialty 0)"));
    assert!(texts[3].contains("(Specialty 0 \\(continued\\))"));
    assert!(texts[6].contains("(cover4)"));
    assert!(texts.iter().all(|t| !t.contains("(cover2)") && !t.contains("(cover3)")));

    println!("✓ Built {} pages", report.output_pages);
}

#[test]
fn test_build_with_single_page_attachment() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "cover", 1);
    let attachment = load_document(&attach_path).unwrap();

    let blocks = parse_sheet(directory_csv(1, 3).as_bytes(), &SheetOptions::default()).unwrap();
    let (merged, report) = build_document(&blocks, &attachment, &BuildOptions::default())
        .expect("Failed to build document");

    assert_eq!(report.output_pages, 2);
    let texts = page_texts(&merged);
    assert!(texts[0].contains("(cover0)"));
    assert!(texts[1].contains("(Doctor 0-0)"));
}

#[test]
fn test_build_with_empty_attachment() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let sheet_path = temp_dir.path().join("directory.csv");
    std::fs::write(&sheet_path, directory_csv(1, 20)).expect("Failed to write sheet");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "cover", 0);
    let output_path = temp_dir.path().join("directory.pdf");

    let report = build_directory(&sheet_path, &attach_path, &output_path, &BuildOptions::default())
        .expect("Failed to build directory");

    assert_eq!(report.attachment_pages, 0);
    assert_eq!(report.pagination.pages, 2);
    assert_eq!(report.output_pages, report.pagination.pages);
    assert_eq!(count_pages(&output_path).unwrap(), 2);

    let texts = page_texts(&load_document(&output_path).unwrap());
    assert!(texts[0].contains("(Specialty 0)"));
    assert!(texts.iter().all(|t| !t.contains("(cover")));
}

#[test]
fn test_build_rejects_non_contiguous_groups() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let sheet_path = temp_dir.path().join("directory.csv");
    std::fs::write(
        &sheet_path,
        "Specialty,Name\nCardiology,Ana\nDermatology,Luis\nCardiology,Marta\n",
    )
    .unwrap();
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "cover", 3);
    let output_path = temp_dir.path().join("directory.pdf");

    let result = build_directory(&sheet_path, &attach_path, &output_path, &BuildOptions::default());

    assert!(matches!(result, Err(Error::MalformedBlock { .. })));
    assert!(!output_path.exists(), "No partial output should be written");
}

#[test]
fn test_build_rejects_zero_capacity() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "cover", 2);
    let attachment = load_document(&attach_path).unwrap();
    let options = BuildOptions {
        pagination: PaginationConfig::with_rows_per_page(0),
        ..Default::default()
    };

    let result = build_document(&[], &attachment, &options);
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_build_missing_sheet() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "cover", 2);

    let result = build_directory(
        Path::new("nonexistent.csv"),
        &attach_path,
        &temp_dir.path().join("out.pdf"),
        &BuildOptions::default(),
    );

    if let Err(e) = result {
        assert!(e.to_string().contains("not found"), "Error should mention file not found: {}", e);
    } else {
        panic!("Should fail with nonexistent sheet");
    }
}

#[test]
fn test_assemble_files_page_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "a", 5);
    let generated_path = write_labelled_pdf(temp_dir.path(), "generated.pdf", "g", 1);
    let output_path = temp_dir.path().join("merged.pdf");

    let page_count = assemble_files(&attach_path, &generated_path, &output_path, &AssemblyPolicy::default())
        .expect("Failed to assemble");

    assert_eq!(page_count, 4);
    let merged = load_document(&output_path).unwrap();
    let texts = page_texts(&merged);
    for (text, label) in texts.iter().zip(["(a0)", "(a1)", "(g0)", "(a4)"]) {
        assert!(text.contains(label), "expected {} in {}", label, text);
    }

    let metadata = extract_metadata(&output_path).unwrap();
    assert_eq!(metadata.page_count, 4);
    assert!(metadata.producer.unwrap().starts_with("pdf-directory"));
}

#[test]
fn test_assemble_files_empty_generated() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "a", 3);
    let generated_path = write_labelled_pdf(temp_dir.path(), "generated.pdf", "g", 0);
    let output_path = temp_dir.path().join("merged.pdf");

    let page_count = assemble_files(&attach_path, &generated_path, &output_path, &AssemblyPolicy::default())
        .expect("Failed to assemble");

    assert_eq!(page_count, 3);
    let texts = page_texts(&load_document(&output_path).unwrap());
    for (text, label) in texts.iter().zip(["(a0)", "(a1)", "(a2)"]) {
        assert!(text.contains(label), "expected {} in {}", label, text);
    }
}

#[test]
fn test_assemble_files_empty_attachment() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let attach_path = write_labelled_pdf(temp_dir.path(), "cover.pdf", "a", 0);
    let generated_path = write_labelled_pdf(temp_dir.path(), "generated.pdf", "g", 2);
    let output_path = temp_dir.path().join("merged.pdf");

    let page_count = assemble_files(&attach_path, &generated_path, &output_path, &AssemblyPolicy::default())
        .expect("Failed to assemble");

    assert_eq!(page_count, 2);
    let texts = page_texts(&load_document(&output_path).unwrap());
    assert!(texts[0].contains("(g0)"));
    assert!(texts[1].contains("(g1)"));
}

#[test]
fn test_assemble_nonexistent_attachment() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let generated_path = write_labelled_pdf(temp_dir.path(), "generated.pdf", "g", 1);

    let result = assemble_files(
        Path::new("nonexistent.pdf"),
        &generated_path,
        &temp_dir.path().join("out.pdf"),
        &AssemblyPolicy::default(),
    );

    assert!(matches!(result, Err(Error::FileNotFound(_))));
}
