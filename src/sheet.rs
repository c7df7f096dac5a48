//! Spreadsheet ingestion
//!
//! Reads a CSV export of a spreadsheet into blocks. The first record holds
//! the column titles. Rows are grouped by a group column: every contiguous
//! run of rows with the same group value becomes a group header, a table
//! header and one data row per spreadsheet row.

use std::io::Read;
use std::path::Path;
use log::debug;
use crate::block::{Block, BlockKind};
use crate::error::{Error, Result};

/// Options for reading a sheet
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Zero-based column holding the group name; `None` for an ungrouped sheet
    pub group_column: Option<usize>,
    /// Zero-based column holding an explicit block kind per row
    ///
    /// When set, headers are not synthesized: each row becomes a block of the
    /// kind it names (empty means data row).
    pub kind_column: Option<usize>,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            group_column: Some(0),
            kind_column: None,
            delimiter: b',',
        }
    }
}

impl SheetOptions {
    fn is_content_column(&self, column: usize) -> bool {
        Some(column) != self.group_column && Some(column) != self.kind_column
    }

    /// Cells of `record` that end up in block content, padded to the header width
    fn content_of(&self, record: &csv::StringRecord, width: usize) -> Vec<String> {
        (0..width)
            .filter(|&column| self.is_content_column(column))
            .map(|column| record.get(column).unwrap_or("").trim().to_string())
            .collect()
    }
}

/// Load a sheet from a CSV file
pub fn load_sheet(path: &Path, options: &SheetOptions) -> Result<Vec<Block>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path)?;
    read_blocks(file, options)?.ok_or_else(|| Error::EmptySheet(path.to_path_buf()))
}

/// Parse CSV data into blocks
pub fn parse_sheet<R: Read>(reader: R, options: &SheetOptions) -> Result<Vec<Block>> {
    read_blocks(reader, options)?
        .ok_or_else(|| Error::General("Sheet has no header row".to_string()))
}

/// Blocks of the sheet, or `None` when it has no header row
fn read_blocks<R: Read>(reader: R, options: &SheetOptions) -> Result<Option<Vec<Block>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let mut records = reader.records();
    let header = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if !is_blank(&record) {
                    break record;
                }
            }
            None => return Ok(None),
        }
    };

    let width = header.len();
    let titles = options.content_of(&header, width);
    let mut blocks = Vec::new();
    let mut current_group: Option<String> = None;

    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());

        let group = match options.group_column {
            Some(column) => {
                let name = record.get(column).unwrap_or("").trim();
                if name.is_empty() {
                    return Err(Error::malformed(
                        blocks.len(),
                        format!("line {} has no value in group column {}", line, column + 1),
                    ));
                }
                Some(name.to_string())
            }
            None => None,
        };
        let content = options.content_of(&record, width);

        if let Some(column) = options.kind_column {
            let kind = match record.get(column).map(str::trim) {
                None | Some("") => BlockKind::DataRow,
                Some(name) => name
                    .parse::<BlockKind>()
                    .map_err(|e| Error::malformed(blocks.len(), format!("line {}: {}", line, e)))?,
            };
            blocks.push(Block {
                kind,
                units: 1,
                content,
                group,
            });
            continue;
        }

        let starts_group = blocks.is_empty() || group != current_group;
        if starts_group {
            if let Some(name) = &group {
                blocks.push(Block::group_header(name.clone()));
            }
            blocks.push(Block::table_header(group.clone(), titles.clone()));
            current_group = group.clone();
        }
        blocks.push(Block::data_row(group, content));
    }

    debug!("Read {} blocks from sheet with {} columns", blocks.len(), width);
    Ok(Some(blocks))
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}
