//! Page geometry and measurement fallbacks.
//!
//! All lengths are CSS pixels (96 dpi). The defaults describe an A4 sheet at
//! 794 × 1123 px with 48 px padding on every side.
//!
//! The safe content height deliberately sits below the real content box: the
//! safety margin absorbs measurement slack and sub-pixel rounding so a packed page
//! never touches the page border.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::block::BlockKind;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("page budget must be a positive finite number, got {0}")]
    InvalidBudget(f32),

    #[error("invalid page config: {0}")]
    InvalidConfig(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback heights
// ────────────────────────────────────────────────────────────────────────────

/// Heights used when a block cannot be measured.
///
/// Too small risks a visually overflowing page; too large wastes pages. The defaults
/// are roughly what each block occupies with one or two lines of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackHeights {
    pub personal_info: f32,
    pub section_header: f32,
    pub work_item: f32,
    pub education_item: f32,
    pub skills_header: f32,
    pub skills_content: f32,
}

impl Default for FallbackHeights {
    fn default() -> Self {
        Self {
            personal_info: 120.0,
            section_header: 40.0,
            work_item: 100.0,
            education_item: 80.0,
            skills_header: 40.0,
            skills_content: 100.0,
        }
    }
}

impl FallbackHeights {
    pub fn for_kind(&self, kind: BlockKind) -> f32 {
        match kind {
            BlockKind::PersonalInfo => self.personal_info,
            BlockKind::SectionHeader => self.section_header,
            BlockKind::WorkItem => self.work_item,
            BlockKind::EducationItem => self.education_item,
            BlockKind::SkillsHeader => self.skills_header,
            BlockKind::SkillsContent => self.skills_content,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> {
        [
            ("personal_info", self.personal_info),
            ("section_header", self.section_header),
            ("work_item", self.work_item),
            ("education_item", self.education_item),
            ("skills_header", self.skills_header),
            ("skills_content", self.skills_content),
        ]
        .into_iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Layout parameters shared by the packer, the preview and the PDF exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    /// Padding on each side of the page.
    pub padding: f32,
    /// Subtracted from the content height to get the packing budget.
    pub safety_margin: f32,
    /// Gap kept between the rendered content box and the bottom border.
    pub render_clearance: f32,
    pub max_preview_zoom: f32,
    /// Horizontal space the preview container keeps free around the page.
    pub preview_gutter: f32,
    /// When set, a section header and its first item must fit together or both
    /// move to the next page.
    pub keep_header_with_first_item: bool,
    pub fallback: FallbackHeights,
}

/// A4 at 96 dpi with the preview's default padding and margins.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width: 794.0,
        page_height: 1123.0,
        padding: 48.0,
        safety_margin: 50.0,
        render_clearance: 10.0,
        max_preview_zoom: 1.2,
        preview_gutter: 40.0,
        keep_header_with_first_item: true,
        fallback: FallbackHeights::default(),
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        default_page_config()
    }
}

impl PageConfig {
    /// Width every block is laid out at.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.padding
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.padding
    }

    /// The packing budget: content height minus the safety margin.
    pub fn safe_content_height(&self) -> f32 {
        self.content_height() - self.safety_margin
    }

    /// Height of the clipped box a page's content is drawn into.
    pub fn render_height(&self) -> f32 {
        self.content_height() - self.render_clearance
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let lengths = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("padding", self.padding),
            ("safety_margin", self.safety_margin),
            ("render_clearance", self.render_clearance),
            ("preview_gutter", self.preview_gutter),
        ];
        for (name, value) in lengths.into_iter().chain(self.fallback.iter()) {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.max_preview_zoom.is_finite() || self.max_preview_zoom <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "max_preview_zoom must be positive, got {}",
                self.max_preview_zoom
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(LayoutError::InvalidConfig(
                "padding leaves no content width".to_string(),
            ));
        }
        if self.safe_content_height() <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "safe content height must be positive, got {}",
                self.safe_content_height()
            )));
        }
        Ok(())
    }
}
