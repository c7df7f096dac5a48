//! Greedy pagination of blocks into fixed-capacity pages
//!
//! Blocks are placed left to right. A block that does not fit seals the
//! current page and opens the next one; a group that carries over a page
//! boundary gets a synthesized continuation note at the top of the new page.
//! Blocks are never split, reordered, dropped or edited.

use std::collections::{HashMap, HashSet};
use log::{debug, warn};
use crate::block::{Block, BlockKind, PaginationConfig};
use crate::error::{Error, Result};

/// A sealed page: ordered blocks plus the capacity units they consume
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Page {
    blocks: Vec<Block>,
    used: u32,
}

impl Page {
    /// Blocks on this page, in placement order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Units consumed, including section spacing
    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether this page holds more units than the configured capacity
    pub fn is_overflowing(&self, config: &PaginationConfig) -> bool {
        self.used > config.rows_per_page
    }

    /// Number of synthesized continuation notes on this page
    pub fn continuation_notes(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_synthesized()).count()
    }

    fn push(&mut self, block: Block, units: u32) {
        self.blocks.push(block);
        self.used = self.used.saturating_add(units);
    }

    /// Whether `units` more still fit under `capacity`
    fn fits(&self, units: u32, capacity: u32) -> bool {
        self.used.checked_add(units).is_some_and(|total| total <= capacity)
    }

    fn last_group(&self) -> Option<&str> {
        self.blocks.last().and_then(|b| b.group.as_deref())
    }
}

/// Accumulator threaded through the greedy pass
struct Paginator<'a> {
    config: &'a PaginationConfig,
    sealed: Vec<Page>,
    open: Page,
    /// Group of the previously placed input block; `None` before the first block
    previous_group: Option<Option<String>>,
    closed_groups: HashSet<String>,
    titles: HashMap<String, Vec<String>>,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a PaginationConfig) -> Self {
        Self {
            config,
            sealed: Vec::new(),
            open: Page::default(),
            previous_group: None,
            closed_groups: HashSet::new(),
            titles: HashMap::new(),
        }
    }

    fn place(mut self, index: usize, block: &Block) -> Result<Self> {
        if block.kind == BlockKind::ContinuationNote {
            return Err(Error::malformed(
                index,
                "continuation notes are synthesized during pagination and cannot be supplied",
            ));
        }

        let starts_section = match &self.previous_group {
            Some(previous) if *previous != block.group => {
                if let Some(finished) = previous {
                    self.closed_groups.insert(finished.clone());
                }
                true
            }
            _ => false,
        };

        if let Some(group) = &block.group {
            if self.closed_groups.contains(group) {
                return Err(Error::malformed(
                    index,
                    format!("group '{}' reappears after another group started", group),
                ));
            }
            if block.kind == BlockKind::GroupHeader {
                self.titles.insert(group.clone(), block.content.clone());
            }
        }
        self.previous_group = Some(block.group.clone());

        let capacity = self.config.rows_per_page;
        let cost = block.cost(self.config);

        if cost > capacity {
            warn!(
                "Block {} ({}) costs {} units, more than the {} available; placing it alone",
                index, block.kind, cost, capacity
            );
            self.place_alone(block, cost);
            return Ok(self);
        }

        let spacing = if starts_section && !self.open.is_empty() {
            self.config.section_spacing_units
        } else {
            0
        };

        if !self.open.is_empty() && self.open.fits(spacing.saturating_add(cost), capacity) {
            self.open.push(block.clone(), spacing.saturating_add(cost));
            return Ok(self);
        }

        // Spacing is never charged at the top of a page
        self.seal();
        if let Some(note) = self.continuation_for(block) {
            let note_cost = note.cost(self.config);
            if note_cost.saturating_add(cost) > capacity {
                warn!(
                    "Block {} ({}) costs {} units, more than the {} left after a continuation note; placing it alone",
                    index, block.kind, cost, capacity.saturating_sub(note_cost)
                );
                self.place_alone(block, cost);
                return Ok(self);
            }
            self.open.push(note, note_cost);
        }
        self.open.push(block.clone(), cost);

        Ok(self)
    }

    /// Note to open a fresh page with, when `block` continues the group of the last sealed page
    fn continuation_for(&self, block: &Block) -> Option<Block> {
        let group = block.group.as_deref()?;
        let previous = self.sealed.last()?;
        if previous.last_group() != Some(group) {
            return None;
        }

        let content = self.titles.get(group).cloned().unwrap_or_default();
        Some(Block::continuation_note(Some(group.to_string()), content))
    }

    /// Put `block` on a page of its own and seal it
    fn place_alone(&mut self, block: &Block, cost: u32) {
        self.seal();
        self.open.push(block.clone(), cost);
        self.seal();
    }

    fn seal(&mut self) {
        if self.open.is_empty() {
            return;
        }
        let page = std::mem::take(&mut self.open);
        debug!(
            "Sealed page {} with {} blocks ({} of {} units)",
            self.sealed.len() + 1,
            page.len(),
            page.used,
            self.config.rows_per_page
        );
        self.sealed.push(page);
    }

    fn finish(mut self) -> Vec<Page> {
        self.seal();
        self.sealed
    }
}

/// Partition blocks into pages under the configured capacity
///
/// Fails with [`Error::Configuration`] for a zero capacity and with
/// [`Error::MalformedBlock`] for a supplied continuation note or a group
/// whose blocks are not contiguous. Empty input gives no pages.
///
/// # Example
///
/// ```
/// use pdf_directory::block::{Block, PaginationConfig};
/// use pdf_directory::paginate::paginate;
///
/// let group = Some("Staff".to_string());
/// let mut blocks = vec![Block::table_header(group.clone(), vec!["Name".into()])];
/// for i in 0..20 {
///     blocks.push(Block::data_row(group.clone(), vec![format!("Person {}", i)]));
/// }
///
/// let pages = paginate(&blocks, &PaginationConfig::with_rows_per_page(14)).unwrap();
/// assert_eq!(pages.len(), 2);
/// assert_eq!(pages[0].used(), 14);
/// assert_eq!(pages[1].used(), 8);
/// ```
pub fn paginate(blocks: &[Block], config: &PaginationConfig) -> Result<Vec<Page>> {
    config.validate()?;

    let paginator = blocks
        .iter()
        .enumerate()
        .try_fold(Paginator::new(config), |acc, (index, block)| acc.place(index, block))?;

    Ok(paginator.finish())
}

/// Counts describing a pagination result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    pub pages: usize,
    pub blocks: usize,
    pub continuation_notes: usize,
    pub overflowing_pages: usize,
}

impl PaginationSummary {
    pub fn of(pages: &[Page], config: &PaginationConfig) -> Self {
        Self {
            pages: pages.len(),
            blocks: pages.iter().map(Page::len).sum(),
            continuation_notes: pages.iter().map(Page::continuation_notes).sum(),
            overflowing_pages: pages.iter().filter(|p| p.is_overflowing(config)).count(),
        }
    }
}
