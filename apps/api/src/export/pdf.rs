//! Multi-page PDF export of a pagination.
//!
//! Each `Page` becomes one PDF page sized to the configured page (px → pt at 0.75).
//! Blocks are laid out with the same line layout the measurement estimator uses and
//! drawn at their packed offsets, so the PDF matches the preview page for page.
//! Text uses the base-14 Type1 fonts with WinAnsiEncoding; nothing is embedded.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use tracing::info;

use crate::export::ExportError;
use crate::layout::font_metrics::{get_metrics, FontFamily, FontStyle};
use crate::layout::text_metrics::{layout_block, LayoutElement, TextLine};
use crate::layout::{Page, PageConfig};

const PX_TO_PT: f32 = 0.75;
const FOOTER_SIZE: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub title: String,
    pub family: FontFamily,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: "Resume".to_string(),
            family: FontFamily::Helvetica,
        }
    }
}

fn font_resource(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "F1",
        FontStyle::Bold => "F2",
        FontStyle::Italic => "F3",
    }
}

fn base_font(family: FontFamily, style: FontStyle) -> &'static str {
    match (family, style) {
        (FontFamily::Helvetica, FontStyle::Regular) => "Helvetica",
        (FontFamily::Helvetica, FontStyle::Bold) => "Helvetica-Bold",
        (FontFamily::Helvetica, FontStyle::Italic) => "Helvetica-Oblique",
        (FontFamily::Times, FontStyle::Regular) => "Times-Roman",
        (FontFamily::Times, FontStyle::Bold) => "Times-Bold",
        (FontFamily::Times, FontStyle::Italic) => "Times-Italic",
    }
}

/// Encodes text for a WinAnsiEncoding font. Characters outside the code page become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Content stream
// ────────────────────────────────────────────────────────────────────────────

/// Converts content-box px coordinates into PDF user space.
struct PageSpace {
    page_height: f32,
}

impl PageSpace {
    fn x(&self, px: f32) -> Object {
        (px * PX_TO_PT).into()
    }

    fn y(&self, px_from_top: f32) -> Object {
        ((self.page_height - px_from_top) * PX_TO_PT).into()
    }

    fn len(&self, px: f32) -> Object {
        (px * PX_TO_PT).into()
    }
}

fn text_ops(ops: &mut Vec<Operation>, space: &PageSpace, line: &TextLine, left: f32, top: f32) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(font_resource(line.style).as_bytes().to_vec()),
            space.len(line.size),
        ],
    ));
    ops.push(Operation::new(
        "Td",
        vec![space.x(left + line.x), space.y(top + line.baseline())],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(to_win_ansi(&line.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn page_operations(
    page: &Page,
    page_count: usize,
    config: &PageConfig,
    family: FontFamily,
) -> Vec<Operation> {
    let space = PageSpace {
        page_height: config.page_height,
    };
    let width = config.content_width();
    let mut ops = vec![Operation::new("g", vec![Object::Integer(0)])];

    for placed in &page.blocks {
        let block_top = config.padding + placed.top;
        let layout = layout_block(&placed.block, width, family);
        for element in &layout.elements {
            match element {
                LayoutElement::Text(line) => {
                    text_ops(&mut ops, &space, line, config.padding, block_top);
                }
                LayoutElement::Rule { top, thickness } => {
                    ops.push(Operation::new(
                        "re",
                        vec![
                            space.x(config.padding),
                            space.y(block_top + top + thickness),
                            space.len(width),
                            space.len(*thickness),
                        ],
                    ));
                    ops.push(Operation::new("f", vec![]));
                }
            }
        }
    }

    if page_count > 1 {
        let label = format!("Page {} of {}", page.number, page_count);
        let label_width = get_metrics(family).measure_str(&label, FOOTER_SIZE, FontStyle::Regular);
        let footer = TextLine {
            text: label,
            x: (width - label_width) / 2.0,
            top: config.page_height - config.padding / 2.0 - FOOTER_SIZE,
            size: FOOTER_SIZE,
            line_height: FOOTER_SIZE,
            style: FontStyle::Regular,
        };
        text_ops(&mut ops, &space, &footer, config.padding, 0.0);
    }
    ops
}

// ────────────────────────────────────────────────────────────────────────────
// Document assembly
// ────────────────────────────────────────────────────────────────────────────

/// Renders every page into one PDF, in page order.
pub fn render_pdf(
    pages: &[Page],
    config: &PageConfig,
    options: &PdfOptions,
) -> Result<Vec<u8>, ExportError> {
    if pages.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let fonts = Dictionary::from_iter(
        [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic].map(|style| {
            let font = Dictionary::from_iter(vec![
                ("Type", "Font".into()),
                ("Subtype", "Type1".into()),
                ("BaseFont", base_font(options.family, style).into()),
                ("Encoding", "WinAnsiEncoding".into()),
            ]);
            (font_resource(style), Object::Reference(doc.add_object(font)))
        }),
    );
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(fonts),
    )]));

    let media_box = Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        (config.page_width * PX_TO_PT).into(),
        (config.page_height * PX_TO_PT).into(),
    ]);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, pages.len(), config, options.family),
        };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", "Page".into()),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", media_box.clone()),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", "Pages".into()),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", "Catalog".into()),
        ("Pages", Object::Reference(pages_id)),
    ]));
    let info_id = doc.add_object(Dictionary::from_iter(vec![
        (
            "Title",
            Object::String(to_win_ansi(&options.title), StringFormat::Literal),
        ),
        (
            "Producer",
            Object::String(env!("CARGO_PKG_NAME").into(), StringFormat::Literal),
        ),
        (
            "CreationDate",
            Object::String(
                Utc::now().format("D:%Y%m%d%H%M%SZ").to_string().into_bytes(),
                StringFormat::Literal,
            ),
        ),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Encode(e.to_string()))?;

    info!(pages = pages.len(), bytes = bytes.len(), "PDF exported");
    Ok(bytes)
}
