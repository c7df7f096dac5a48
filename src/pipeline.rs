//! End-to-end directory build: sheet → pages → PDF → merged with attachment

use std::path::Path;
use std::time::Instant;
use lopdf::Document;
use log::{info, warn};
use crate::assemble::AssemblyPolicy;
use crate::block::{Block, PaginationConfig};
use crate::error::Result;
use crate::paginate::{paginate, PaginationSummary};
use crate::pdf::document::{read_document, save_document, stamp_info};
use crate::pdf::{merge_documents, render_pages, RenderOptions};
use crate::sheet::{load_sheet, SheetOptions};

/// Everything that parameterizes a build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub sheet: SheetOptions,
    pub pagination: PaginationConfig,
    pub render: RenderOptions,
    pub policy: AssemblyPolicy,
}

/// What a build produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub pagination: PaginationSummary,
    pub attachment_pages: usize,
    pub output_pages: usize,
}

/// Paginate and render blocks, then wrap them in the attachment
///
/// Nothing is returned unless every stage succeeds.
pub fn build_document(
    blocks: &[Block],
    attachment: &Document,
    options: &BuildOptions,
) -> Result<(Document, BuildReport)> {
    let pages = paginate(blocks, &options.pagination)?;
    let summary = PaginationSummary::of(&pages, &options.pagination);
    info!(
        "Paginated {} blocks into {} pages ({} continuation notes)",
        blocks.len(),
        summary.pages,
        summary.continuation_notes
    );
    if summary.overflowing_pages > 0 {
        warn!(
            "{} pages hold a block larger than {} rows",
            summary.overflowing_pages, options.pagination.rows_per_page
        );
    }

    let generated = render_pages(&pages, &options.pagination, &options.render)?;
    let mut merged = merge_documents(attachment, &generated, &options.policy)?;
    stamp_info(&mut merged, options.render.title.as_deref());

    let report = BuildReport {
        pagination: summary,
        attachment_pages: attachment.get_pages().len(),
        output_pages: merged.get_pages().len(),
    };
    Ok((merged, report))
}

/// Build a directory PDF from a sheet file and an attachment PDF
///
/// The output file is only written once the whole document is ready.
pub fn build_directory(
    sheet_path: &Path,
    attachment_path: &Path,
    output_path: &Path,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let t0 = Instant::now();

    let blocks = load_sheet(sheet_path, &options.sheet)?;
    let attachment = read_document(attachment_path)?;
    let t_load = t0.elapsed();

    let (mut merged, report) = build_document(&blocks, &attachment, options)?;
    let t_build = t0.elapsed();

    save_document(&mut merged, output_path)?;
    let t_total = t0.elapsed();

    info!(
        "Timing: load={:.1}ms, build={:.1}ms, write={:.1}ms, total={:.1}ms ({} pages)",
        t_load.as_secs_f64() * 1000.0,
        (t_build - t_load).as_secs_f64() * 1000.0,
        (t_total - t_build).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        report.output_pages,
    );

    Ok(report)
}
