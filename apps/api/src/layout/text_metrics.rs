//! Text-metrics estimator: lays a block out into positioned lines.
//!
//! Styles mirror the browser preview (Arial-compatible metrics, px units):
//!
//! | Element | Size | Line height | Spacing |
//! |---|---|---|---|
//! | name | 28 bold, centered | 1.235 | 8 below |
//! | contact row | 12, centered, `•`-separated | 1.43 | |
//! | summary | 13 | 1.6 | 16 above |
//! | section header | 16 bold uppercase | 1.6 | 4 + 2px rule + 16 below |
//! | item title | 14 bold, date range 12 right-aligned | 1.75 | |
//! | organization | 13 italic | 1.43 | 4 below (work) |
//! | description | 12 | 1.6 | 4 around paragraphs, 8 around lists, 20 list indent |
//! | skills row | 12, bold category label | 1.43 | 8 below |
//!
//! Personal info is followed by 24px and each item by 16px. The measured height is the
//! bottom of the last element plus that trailing spacing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::layout::block::{Block, SkillGroup, SKILLS_TITLE};
use crate::layout::font_metrics::{get_metrics, FontFamily, FontMetricTable, FontStyle};
use crate::layout::measure::{MeasureError, MeasurementProvider};
use crate::layout::rich_text::to_paragraphs;
use crate::models::{EducationItem, PersonalInfo, WorkItem};

const NAME_SIZE: f32 = 28.0;
const CONTACT_SIZE: f32 = 12.0;
const SUMMARY_SIZE: f32 = 13.0;
const HEADER_SIZE: f32 = 16.0;
const TITLE_SIZE: f32 = 14.0;
const DATE_SIZE: f32 = 12.0;
const ORG_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 12.0;

const BODY_LINE_HEIGHT: f32 = 1.6;
const CAPTION_LINE_HEIGHT: f32 = 1.43;

const PERSONAL_BOTTOM: f32 = 24.0;
const ITEM_BOTTOM: f32 = 16.0;
const HEADER_RULE: f32 = 2.0;
const LIST_INDENT: f32 = 20.0;
const DATE_GAP: f32 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Left edge relative to the content box.
    pub x: f32,
    /// Top of the line box relative to the block.
    pub top: f32,
    pub size: f32,
    pub line_height: f32,
    pub style: FontStyle,
}

impl TextLine {
    /// Distance from the block top to the text baseline.
    pub fn baseline(&self) -> f32 {
        // Glyph box centered in the line box, ascent ≈ 0.8 em.
        self.top + (self.line_height - self.size) / 2.0 + self.size * 0.8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutElement {
    Text(TextLine),
    Rule { top: f32, thickness: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLayout {
    pub elements: Vec<LayoutElement>,
    pub height: f32,
}

enum Align {
    Left(f32),
    Center,
    Right,
}

/// Accumulates positioned elements for one block.
struct Cursor<'a> {
    metrics: &'a FontMetricTable,
    width: f32,
    y: f32,
    elements: Vec<LayoutElement>,
}

impl<'a> Cursor<'a> {
    fn new(metrics: &'a FontMetricTable, width: f32) -> Self {
        Self {
            metrics,
            width,
            y: 0.0,
            elements: Vec::new(),
        }
    }

    fn line(&mut self, text: String, size: f32, lh: f32, style: FontStyle, align: Align) {
        let text_w = self.metrics.measure_str(&text, size, style);
        let x = match align {
            Align::Left(indent) => indent,
            Align::Center => ((self.width - text_w) / 2.0).max(0.0),
            Align::Right => (self.width - text_w).max(0.0),
        };
        self.elements.push(LayoutElement::Text(TextLine {
            text,
            x,
            top: self.y,
            size,
            line_height: size * lh,
            style,
        }));
        self.y += size * lh;
    }

    /// Wraps `text` at the block width (minus `indent`) and advances past it.
    fn paragraph(&mut self, text: &str, size: f32, lh: f32, style: FontStyle, indent: f32) {
        let avail = self.width - indent;
        for line in self.metrics.wrap(text, avail, avail, size, style) {
            self.line(line, size, lh, style, Align::Left(indent));
        }
    }

    fn centered(&mut self, text: &str, size: f32, lh: f32, style: FontStyle) {
        for line in self.metrics.wrap(text, self.width, self.width, size, style) {
            self.line(line, size, lh, style, Align::Center);
        }
    }

    fn gap(&mut self, px: f32) {
        self.y += px;
    }

    fn rule(&mut self, thickness: f32) {
        self.elements.push(LayoutElement::Rule {
            top: self.y,
            thickness,
        });
        self.y += thickness;
    }

    /// Title on the left, date range right-aligned on the first title line.
    fn title_row(&mut self, title: &str, dates: &str) {
        let date_w = self.metrics.measure_str(dates, DATE_SIZE, FontStyle::Regular);
        let title_w = (self.width - date_w - DATE_GAP).max(self.width / 2.0);
        let lh = 1.75;
        let row_top = self.y;
        let lines = self
            .metrics
            .wrap(title, title_w, title_w, TITLE_SIZE, FontStyle::Bold);
        if lines.is_empty() {
            self.y += TITLE_SIZE * lh;
        }
        for line in lines {
            self.line(line, TITLE_SIZE, lh, FontStyle::Bold, Align::Left(0.0));
        }
        if !dates.is_empty() {
            let row_bottom = self.y;
            self.y = row_top;
            // Center the smaller date text in the title's first line box.
            self.y += (TITLE_SIZE * lh - DATE_SIZE * lh) / 2.0;
            self.line(dates.to_string(), DATE_SIZE, lh, FontStyle::Regular, Align::Right);
            self.y = row_bottom;
        }
    }

    /// Rich-text description: paragraphs and list items.
    fn rich_text(&mut self, html: &str) {
        let paragraphs = to_paragraphs(html);
        let mut in_list = false;
        for paragraph in paragraphs {
            match &paragraph.marker {
                Some(marker) => {
                    if !in_list {
                        self.gap(8.0);
                        in_list = true;
                    }
                    let marker_top = self.y;
                    self.paragraph(
                        &paragraph.text,
                        BODY_SIZE,
                        BODY_LINE_HEIGHT,
                        FontStyle::Regular,
                        LIST_INDENT,
                    );
                    let bottom = self.y;
                    self.y = marker_top;
                    self.line(
                        marker.as_text(),
                        BODY_SIZE,
                        BODY_LINE_HEIGHT,
                        FontStyle::Regular,
                        Align::Left(LIST_INDENT / 2.0 - 4.0),
                    );
                    self.y = bottom + 4.0;
                }
                None => {
                    if in_list {
                        self.gap(8.0);
                        in_list = false;
                    }
                    self.gap(4.0);
                    self.paragraph(
                        &paragraph.text,
                        BODY_SIZE,
                        BODY_LINE_HEIGHT,
                        FontStyle::Regular,
                        0.0,
                    );
                    self.gap(4.0);
                }
            }
        }
        if in_list {
            self.gap(8.0);
        }
    }

    fn finish(self, trailing: f32) -> BlockLayout {
        BlockLayout {
            height: self.y + trailing,
            elements: self.elements,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Date formatting
// ────────────────────────────────────────────────────────────────────────────

/// "Jan 2020". An open-ended range renders its end as "Present".
pub fn format_date(date: Option<NaiveDate>, current: bool) -> String {
    if current {
        return "Present".to_string();
    }
    date.map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

pub fn format_range(start: NaiveDate, end: Option<NaiveDate>, current: bool) -> String {
    format!(
        "{} - {}",
        format_date(Some(start), false),
        format_date(end, current)
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Block layouts
// ────────────────────────────────────────────────────────────────────────────

fn layout_personal(c: &mut Cursor<'_>, info: &PersonalInfo) {
    let name = if info.full_name.trim().is_empty() {
        "Your Name"
    } else {
        info.full_name.as_str()
    };
    c.centered(name, NAME_SIZE, 1.235, FontStyle::Bold);
    c.gap(8.0);

    let contact: Vec<&str> = [
        Some(info.email.as_str()),
        info.phone.as_deref(),
        info.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect();
    if !contact.is_empty() {
        c.centered(
            &contact.join(" \u{2022} "),
            CONTACT_SIZE,
            CAPTION_LINE_HEIGHT,
            FontStyle::Regular,
        );
    }

    if let Some(summary) = info.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        c.gap(16.0);
        for paragraph in to_paragraphs(summary) {
            c.paragraph(
                &paragraph.text,
                SUMMARY_SIZE,
                BODY_LINE_HEIGHT,
                FontStyle::Regular,
                0.0,
            );
        }
    }
}

fn layout_header(c: &mut Cursor<'_>, title: &str) {
    c.paragraph(
        &title.to_uppercase(),
        HEADER_SIZE,
        1.6,
        FontStyle::Bold,
        0.0,
    );
    c.gap(4.0);
    c.rule(HEADER_RULE);
}

fn layout_work(c: &mut Cursor<'_>, item: &WorkItem) {
    c.title_row(
        &item.position,
        &format_range(item.start_date, item.end_date, item.current),
    );
    c.paragraph(
        &item.company_name,
        ORG_SIZE,
        CAPTION_LINE_HEIGHT,
        FontStyle::Italic,
        0.0,
    );
    c.gap(4.0);
    c.rich_text(&item.description);
}

fn layout_education(c: &mut Cursor<'_>, item: &EducationItem) {
    let title = match item.field_of_study.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(field) => format!("{} in {}", item.degree, field),
        None => item.degree.clone(),
    };
    c.title_row(
        &title,
        &format_range(item.start_date, item.end_date, item.current),
    );
    c.paragraph(
        &item.institution,
        ORG_SIZE,
        CAPTION_LINE_HEIGHT,
        FontStyle::Italic,
        0.0,
    );
    if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        c.gap(4.0);
        for paragraph in to_paragraphs(description) {
            c.paragraph(
                &paragraph.text,
                BODY_SIZE,
                BODY_LINE_HEIGHT,
                FontStyle::Regular,
                0.0,
            );
        }
    }
}

fn layout_skills(c: &mut Cursor<'_>, groups: &[SkillGroup]) {
    for group in groups {
        let label = format!("{}: ", group.category.label());
        let label_w = c
            .metrics
            .measure_str(&label, BODY_SIZE, FontStyle::Bold);
        let names = group.names.join(", ");
        let first_width = (c.width - label_w).max(0.0);
        let lines = c
            .metrics
            .wrap(&names, first_width, c.width, BODY_SIZE, FontStyle::Regular);

        let label_top = c.y;
        c.line(
            label,
            BODY_SIZE,
            CAPTION_LINE_HEIGHT,
            FontStyle::Bold,
            Align::Left(0.0),
        );
        if !lines.is_empty() {
            c.y = label_top;
        }
        for (i, line) in lines.into_iter().enumerate() {
            let x = if i == 0 { label_w } else { 0.0 };
            c.line(
                line,
                BODY_SIZE,
                CAPTION_LINE_HEIGHT,
                FontStyle::Regular,
                Align::Left(x),
            );
        }
        c.gap(8.0);
    }
}

/// Lays out a block at `width` using `family`'s metrics.
pub fn layout_block(block: &Block, width: f32, family: FontFamily) -> BlockLayout {
    let mut c = Cursor::new(get_metrics(family), width);
    let trailing = match block {
        Block::PersonalInfo { info } => {
            layout_personal(&mut c, info);
            PERSONAL_BOTTOM
        }
        Block::SectionHeader { section } => {
            layout_header(&mut c, section.title());
            16.0
        }
        Block::SkillsHeader => {
            layout_header(&mut c, SKILLS_TITLE);
            16.0
        }
        Block::WorkItem { item, .. } => {
            layout_work(&mut c, item);
            ITEM_BOTTOM
        }
        Block::EducationItem { item, .. } => {
            layout_education(&mut c, item);
            ITEM_BOTTOM
        }
        Block::SkillsContent { groups } => {
            layout_skills(&mut c, groups);
            0.0
        }
    };
    c.finish(trailing)
}

// ────────────────────────────────────────────────────────────────────────────
// Provider
// ────────────────────────────────────────────────────────────────────────────

/// Measurement provider that estimates heights from static font metrics.
#[derive(Debug, Clone, Copy)]
pub struct TextMetricsProvider {
    pub family: FontFamily,
}

impl Default for TextMetricsProvider {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
        }
    }
}

impl MeasurementProvider for TextMetricsProvider {
    fn measure(&self, block: &Block, content_width: f32) -> Result<f32, MeasureError> {
        if !content_width.is_finite() || content_width <= 0.0 {
            return Err(MeasureError::Unmeasurable {
                key: block.key(),
                reason: format!("content width {content_width} is not positive"),
            });
        }
        Ok(layout_block(block, content_width, self.family).height)
    }
}
