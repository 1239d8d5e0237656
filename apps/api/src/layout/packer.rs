//! Page Packer: greedy, single-pass assignment of measured blocks to pages.
//!
//! # Rules
//! - Blocks are visited in plan order; a block goes onto the current page when
//!   `used + height <= budget`, otherwise a new page is started first.
//! - Work and education items are atomic: never split, moved whole.
//! - Headers appear once per section, never repeated on continuation pages.
//! - The skills header and the skills content are checked as one unit.
//! - With `keep_header_with_first_item`, a section header and its first item are
//!   checked as one unit too; otherwise the header is checked on its own and may end
//!   a page with its first item deferred.
//! - A keep-together unit taller than the whole budget falls back to block-by-block
//!   placement.
//! - A single block taller than the whole budget is placed anyway on a fresh page,
//!   the page is flagged `oversized`, and a warning is reported. Content is never
//!   truncated.
//!
//! The pass is a pure function of the measured plan and the options.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layout::block::{build_blocks, Block, BlockKey};
use crate::layout::measure::{MeasuredBlock, Measurer};
use crate::layout::page_config::{LayoutError, PageConfig};
use crate::models::ResumeDocument;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A block as placed on a page. `top` is its offset from the top of the content box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub block: Block,
    pub height: f32,
    pub top: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub blocks: Vec<PlacedBlock>,
    pub used_height: f32,
    /// True when the page holds a block taller than the budget.
    pub oversized: bool,
}

impl Page {
    pub fn keys(&self) -> Vec<BlockKey> {
        self.blocks.iter().map(|p| p.block.key()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PackWarning {
    /// The block could not be measured; a configured fallback height was used.
    FallbackHeight {
        key: BlockKey,
        height: f32,
        reason: String,
    },
    /// The block is taller than a whole page.
    OversizedBlock {
        key: BlockKey,
        height: f32,
        budget: f32,
        page: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub budget: f32,
    pub warnings: Vec<PackWarning>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackOptions {
    budget: f32,
    keep_header_with_first_item: bool,
}

impl PackOptions {
    pub fn new(budget: f32) -> Result<Self, LayoutError> {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(LayoutError::InvalidBudget(budget));
        }
        Ok(Self {
            budget,
            keep_header_with_first_item: true,
        })
    }

    pub fn from_config(config: &PageConfig) -> Result<Self, LayoutError> {
        Ok(Self::new(config.safe_content_height())?
            .keep_header_with_first_item(config.keep_header_with_first_item))
    }

    pub fn keep_header_with_first_item(mut self, keep: bool) -> Self {
        self.keep_header_with_first_item = keep;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Packing
// ────────────────────────────────────────────────────────────────────────────

struct PageBuilder {
    pages: Vec<Page>,
    current: Vec<PlacedBlock>,
    current_height: f32,
    current_oversized: bool,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            current_height: 0.0,
            current_oversized: false,
        }
    }

    /// Finalizes the current page if it holds anything.
    fn start_new_page(&mut self) {
        if !self.current.is_empty() {
            debug!(
                page = self.pages.len() + 1,
                used = self.current_height,
                blocks = self.current.len(),
                "Page finalized"
            );
            self.pages.push(Page {
                number: self.pages.len() + 1,
                blocks: std::mem::take(&mut self.current),
                used_height: self.current_height,
                oversized: self.current_oversized,
            });
        }
        self.current_height = 0.0;
        self.current_oversized = false;
    }

    fn push(&mut self, measured: MeasuredBlock) {
        self.current.push(PlacedBlock {
            top: self.current_height,
            height: measured.height,
            block: measured.block,
        });
        self.current_height += measured.height;
    }

    fn current_page_number(&self) -> usize {
        self.pages.len() + 1
    }

    fn finish(mut self) -> Vec<Page> {
        self.start_new_page();
        self.pages
    }
}

/// Number of consecutive blocks starting at `i` that must share a page.
fn unit_len(blocks: &[MeasuredBlock], i: usize, options: &PackOptions) -> usize {
    match (&blocks[i].block, blocks.get(i + 1).map(|m| &m.block)) {
        (Block::SkillsHeader, Some(Block::SkillsContent { .. })) => 2,
        (Block::SectionHeader { .. }, Some(Block::WorkItem { .. } | Block::EducationItem { .. }))
            if options.keep_header_with_first_item =>
        {
            2
        }
        _ => 1,
    }
}

/// Packs an already measured plan into pages.
pub fn pack_measured(blocks: Vec<MeasuredBlock>, options: &PackOptions) -> Pagination {
    let budget = options.budget;
    let mut builder = PageBuilder::new();
    let mut warnings = Vec::new();

    let mut i = 0;
    while i < blocks.len() {
        let mut len = unit_len(&blocks, i, options);
        let mut unit_height: f32 = blocks[i..i + len].iter().map(|m| m.height).sum();

        // A unit that fits no page is packed block by block.
        if len > 1 && unit_height > budget {
            len = 1;
            unit_height = blocks[i].height;
        }

        if builder.current_height + unit_height > budget {
            builder.start_new_page();
        }

        if unit_height > budget {
            let key = blocks[i].block.key();
            warn!(
                block = ?key,
                height = unit_height,
                budget,
                "Block is taller than a page; placing it anyway. Shorten its content to fit"
            );
            warnings.push(PackWarning::OversizedBlock {
                key,
                height: unit_height,
                budget,
                page: builder.current_page_number(),
            });
            builder.current_oversized = true;
        }

        for measured in blocks[i..i + len].iter().cloned() {
            builder.push(measured);
        }
        i += len;
    }

    let pages = builder.finish();
    Pagination {
        pages,
        budget,
        warnings,
    }
}

/// Measures and packs a document.
///
/// All heights are resolved through `measurer` before the first placement decision.
pub fn pack(
    document: &ResumeDocument,
    options: &PackOptions,
    measurer: &mut Measurer<'_>,
) -> Pagination {
    let blocks = build_blocks(document);
    let (measured, mut warnings) = measurer.resolve_all(blocks);
    let mut pagination = pack_measured(measured, options);
    warnings.append(&mut pagination.warnings);
    pagination.warnings = warnings;

    debug!(
        pages = pagination.pages.len(),
        warnings = pagination.warnings.len(),
        budget = options.budget,
        "Pagination complete"
    );
    pagination
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
