//! PDF Directory CLI tool
//!
//! A command-line tool for turning spreadsheet exports into paginated PDF
//! directories wrapped in a cover document.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use pdf_directory::assemble::AssemblyPolicy;
use pdf_directory::block::PaginationConfig;
use pdf_directory::paginate::{paginate, PaginationSummary};
use pdf_directory::pdf::{assemble_files, extract_metadata, RenderOptions};
use pdf_directory::pipeline::{build_directory, BuildOptions};
use pdf_directory::sheet::{load_sheet, SheetOptions};

/// PDF Directory - Paginate spreadsheet exports into a print-ready PDF
#[derive(Parser)]
#[command(name = "pdf-directory")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build a directory from a sheet, wrapped in a cover PDF
    pdf-directory build members.csv --attach cover.pdf -o directory.pdf

    # Show how a sheet would be paginated with 20 rows per page
    pdf-directory paginate members.csv --rows-per-page 20

    # Wrap an existing PDF in a cover document
    pdf-directory assemble --attach cover.pdf listing.pdf -o directory.pdf

Set RUST_LOG=debug for per-page details.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate a sheet, render it and merge it with an attachment PDF
    Build {
        /// Spreadsheet export (CSV)
        sheet: PathBuf,

        /// Cover/appendix PDF wrapped around the generated pages
        #[arg(short, long)]
        attach: PathBuf,

        /// Output PDF file path
        #[arg(short, long, default_value = "directory.pdf")]
        output: PathBuf,

        /// Document title stored in the PDF metadata
        #[arg(long)]
        title: Option<String>,

        /// Leave page numbers off the generated pages
        #[arg(long)]
        no_page_numbers: bool,

        #[command(flatten)]
        sheet_args: SheetArgs,

        #[command(flatten)]
        pagination: PaginationArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Print the page layout of a sheet without rendering it
    Paginate {
        /// Spreadsheet export (CSV)
        sheet: PathBuf,

        #[command(flatten)]
        sheet_args: SheetArgs,

        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Merge an already generated PDF with an attachment PDF
    Assemble {
        /// Generated PDF placed between the attachment pages
        generated: PathBuf,

        /// Cover/appendix PDF wrapped around the generated pages
        #[arg(short, long)]
        attach: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

#[derive(Args)]
struct SheetArgs {
    /// Column (1-based) holding the group name
    #[arg(long, default_value_t = 1, conflicts_with = "no_groups")]
    group_column: usize,

    /// Treat the sheet as one ungrouped table
    #[arg(long)]
    no_groups: bool,

    /// Column (1-based) naming each row's block kind; disables automatic headers
    #[arg(long)]
    kind_column: Option<usize>,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

impl SheetArgs {
    fn to_options(&self) -> Result<SheetOptions> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character");
        }
        if self.group_column == 0 || self.kind_column == Some(0) {
            bail!("Column numbers start at 1");
        }
        Ok(SheetOptions {
            group_column: (!self.no_groups).then(|| self.group_column - 1),
            kind_column: self.kind_column.map(|c| c - 1),
            delimiter: self.delimiter as u8,
        })
    }
}

#[derive(Args)]
struct PaginationArgs {
    /// Page capacity in row units
    #[arg(long, default_value_t = 14)]
    rows_per_page: u32,

    /// Units taken by a group header
    #[arg(long, default_value_t = 1)]
    group_header_units: u32,

    /// Units taken by a table header
    #[arg(long, default_value_t = 1)]
    table_header_units: u32,

    /// Units taken by a continuation note
    #[arg(long, default_value_t = 1)]
    continued_note_units: u32,

    /// Blank units between two groups on the same page
    #[arg(long, default_value_t = 0)]
    section_spacing_units: u32,
}

impl From<&PaginationArgs> for PaginationConfig {
    fn from(args: &PaginationArgs) -> Self {
        PaginationConfig {
            rows_per_page: args.rows_per_page,
            group_header_units: args.group_header_units,
            table_header_units: args.table_header_units,
            continued_note_units: args.continued_note_units,
            section_spacing_units: args.section_spacing_units,
        }
    }
}

#[derive(Args)]
struct PolicyArgs {
    /// Attachment pages placed before the generated pages
    #[arg(long, default_value_t = 2)]
    lead_pages: usize,

    /// Attachment pages placed after the generated pages
    #[arg(long, default_value_t = 1)]
    trail_pages: usize,
}

impl From<&PolicyArgs> for AssemblyPolicy {
    fn from(args: &PolicyArgs) -> Self {
        AssemblyPolicy {
            leading: args.lead_pages,
            trailing: args.trail_pages,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            sheet, attach, output, title, no_page_numbers,
            sheet_args, pagination, policy, open,
        } => {
            let render = RenderOptions {
                title,
                page_numbers: !no_page_numbers,
                ..Default::default()
            };
            cmd_build(&sheet, &attach, &output, render, &sheet_args, &pagination, &policy, open)
        }
        Commands::Paginate { sheet, sheet_args, pagination } => {
            cmd_paginate(&sheet, &sheet_args, &pagination)
        }
        Commands::Assemble { generated, attach, output, policy, open } => {
            cmd_assemble(&generated, &attach, &output, &policy, open)
        }
        Commands::Info { input } => {
            cmd_info(&input)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Sheet + attachment in, merged directory out
#[allow(clippy::too_many_arguments)]
fn cmd_build(
    sheet: &Path,
    attach: &Path,
    output: &Path,
    render: RenderOptions,
    sheet_args: &SheetArgs,
    pagination: &PaginationArgs,
    policy: &PolicyArgs,
    open: bool,
) -> Result<()> {
    let options = BuildOptions {
        sheet: sheet_args.to_options()?,
        pagination: pagination.into(),
        render,
        policy: policy.into(),
    };

    eprintln!("Building directory from {}...", sheet.display());

    let report = build_directory(sheet, attach, output, &options)
        .with_context(|| format!("Failed to build {}", output.display()))?;

    eprintln!(
        "Generated {} pages ({} continuation notes), wrapped in {} attachment pages",
        report.pagination.pages,
        report.pagination.continuation_notes,
        report.output_pages - report.pagination.pages,
    );
    eprintln!("Output: {} ({} pages)", output.display(), report.output_pages);

    if open {
        open_file(output)?;
    }

    Ok(())
}

/// Print the page layout of a sheet
fn cmd_paginate(sheet: &Path, sheet_args: &SheetArgs, pagination: &PaginationArgs) -> Result<()> {
    let config = PaginationConfig::from(pagination);
    let blocks = load_sheet(sheet, &sheet_args.to_options()?)
        .with_context(|| format!("Failed to read {}", sheet.display()))?;
    let pages = paginate(&blocks, &config)?;

    for (i, page) in pages.iter().enumerate() {
        println!("Page {} ({}/{} units)", i + 1, page.used(), config.rows_per_page);
        for block in page.blocks() {
            println!("  {:<18} {}", block.kind.name(), block.content.join(" | "));
        }
    }

    let summary = PaginationSummary::of(&pages, &config);
    println!(
        "{} blocks on {} pages, {} continuation notes, {} overflowing pages",
        summary.blocks, summary.pages, summary.continuation_notes, summary.overflowing_pages
    );

    Ok(())
}

/// Merge a generated PDF with an attachment
fn cmd_assemble(
    generated: &Path,
    attach: &Path,
    output: &Path,
    policy: &PolicyArgs,
    open: bool,
) -> Result<()> {
    eprintln!("Merging {} into {}...", generated.display(), attach.display());

    let page_count = assemble_files(attach, generated, output, &policy.into())
        .with_context(|| format!("Failed to assemble {}", output.display()))?;

    eprintln!("Output: {} ({} pages)", output.display(), page_count);

    if open {
        open_file(output)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> Result<()> {
    let metadata = extract_metadata(input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }

    Ok(())
}
