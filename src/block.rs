//! Block model and pagination configuration
//!
//! A block is one placeable unit derived from a spreadsheet row: a data row,
//! a table header, a group header, or a synthesized continuation note.

use std::fmt;
use std::str::FromStr;
use crate::error::{Error, Result};

/// Kind of a placeable block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// One spreadsheet data row
    DataRow,
    /// Column titles of a table
    TableHeader,
    /// Title of a logical section
    GroupHeader,
    /// Marker placed at the top of a page when a group carries over
    ContinuationNote,
}

impl BlockKind {
    /// Canonical name, as accepted by [`BlockKind::from_str`]
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::DataRow => "data-row",
            BlockKind::TableHeader => "table-header",
            BlockKind::GroupHeader => "group-header",
            BlockKind::ContinuationNote => "continuation-note",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockKind {
    type Err = Error;

    /// Parse a kind name; case, `-`, `_` and spaces are ignored
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "datarow" | "row" => Ok(BlockKind::DataRow),
            "tableheader" => Ok(BlockKind::TableHeader),
            "groupheader" => Ok(BlockKind::GroupHeader),
            "continuationnote" | "continuednote" => Ok(BlockKind::ContinuationNote),
            _ => Err(Error::UnknownKind(s.trim().to_string())),
        }
    }
}

/// One placeable content unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    pub kind: BlockKind,
    /// Intrinsic cost of a data row
    ///
    /// Ignored for every other kind: headers and notes always cost what the
    /// [`PaginationConfig`] says.
    pub units: u32,
    /// Cells passed through unchanged to rendering
    pub content: Vec<String>,
    /// Logical section this block belongs to
    pub group: Option<String>,
}

impl Block {
    fn new(kind: BlockKind, group: Option<String>, content: Vec<String>) -> Self {
        Self {
            kind,
            units: 1,
            content,
            group,
        }
    }

    pub fn data_row(group: Option<String>, content: Vec<String>) -> Self {
        Self::new(BlockKind::DataRow, group, content)
    }

    pub fn table_header(group: Option<String>, content: Vec<String>) -> Self {
        Self::new(BlockKind::TableHeader, group, content)
    }

    pub fn group_header(group: impl Into<String>) -> Self {
        let group = group.into();
        Self::new(BlockKind::GroupHeader, Some(group.clone()), vec![group])
    }

    pub fn continuation_note(group: Option<String>, content: Vec<String>) -> Self {
        Self::new(BlockKind::ContinuationNote, group, content)
    }

    /// Set the intrinsic cost; has no effect on the cost of non-data-row kinds
    pub fn with_units(mut self, units: u32) -> Self {
        self.units = units;
        self
    }

    /// Capacity units this block consumes when placed on a page
    pub fn cost(&self, config: &PaginationConfig) -> u32 {
        match self.kind {
            BlockKind::DataRow => self.units,
            BlockKind::TableHeader => config.table_header_units,
            BlockKind::GroupHeader => config.group_header_units,
            BlockKind::ContinuationNote => config.continued_note_units,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.kind == BlockKind::ContinuationNote
    }
}

/// Capacity configuration for one pagination run
///
/// All values are in capacity units (row slots). The defaults are the
/// costs used for the standard landscape directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Base page capacity
    pub rows_per_page: u32,
    pub group_header_units: u32,
    pub table_header_units: u32,
    pub continued_note_units: u32,
    /// Blank units between two groups sharing a page
    pub section_spacing_units: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            rows_per_page: 14,
            group_header_units: 1,
            table_header_units: 1,
            continued_note_units: 1,
            section_spacing_units: 0,
        }
    }
}

impl PaginationConfig {
    /// Config with the given capacity and default structural costs
    pub fn with_rows_per_page(rows_per_page: u32) -> Self {
        Self {
            rows_per_page,
            ..Default::default()
        }
    }

    /// Check the config can place at least one block per page
    pub fn validate(&self) -> Result<()> {
        if self.rows_per_page == 0 {
            return Err(Error::Configuration(
                "rows per page must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
