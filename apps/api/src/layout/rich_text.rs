//! Rich-text descriptions to plain paragraphs.
//!
//! Descriptions come from the editor as a small HTML subset (`p`, `br`, `ul`/`ol`/`li`,
//! inline `strong`/`em`/`u`/`a`). Layout only needs the paragraph structure and the
//! visible text, so inline formatting is dropped and block tags become paragraph breaks.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// List marker of a paragraph that came from an `<li>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Numbered(u32),
}

impl ListMarker {
    pub fn as_text(&self) -> String {
        match self {
            ListMarker::Bullet => "\u{2022}".to_string(),
            ListMarker::Numbered(n) => format!("{n}."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub marker: Option<ListMarker>,
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("tag pattern")
    })
}

fn entity_regex() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern")
    })
}

fn whitespace_regex() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "li" | "ul" | "ol" | "br" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            | "blockquote"
    )
}

/// Decodes the named entities the editor emits plus numeric references.
pub fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or(body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('\u{2013}'),
                    "mdash" => Some('\u{2014}'),
                    "bull" => Some('\u{2022}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

struct ParagraphBuilder {
    paragraphs: Vec<Paragraph>,
    buffer: String,
    pending_marker: Option<ListMarker>,
    lists: Vec<Option<u32>>,
}

impl ParagraphBuilder {
    fn push_text(&mut self, raw: &str) {
        self.buffer.push_str(raw);
    }

    fn flush(&mut self) {
        let collapsed = whitespace_regex().replace_all(&self.buffer, " ");
        let text = decode_entities(collapsed.trim());
        let text = text.trim();
        if !text.is_empty() {
            self.paragraphs.push(Paragraph {
                text: text.to_string(),
                marker: self.pending_marker.take(),
            });
        }
        self.buffer.clear();
    }

    fn open_list_item(&mut self) {
        self.flush();
        self.pending_marker = match self.lists.last_mut() {
            Some(Some(counter)) => {
                *counter += 1;
                Some(ListMarker::Numbered(*counter))
            }
            Some(None) | None => Some(ListMarker::Bullet),
        };
    }
}

/// Splits a rich-text description into visible paragraphs.
///
/// Input without any tags is treated as plain text: each non-blank line is a paragraph.
pub fn to_paragraphs(html: &str) -> Vec<Paragraph> {
    if !tag_regex().is_match(html) {
        return html
            .lines()
            .map(|line| decode_entities(line.trim()))
            .filter(|line| !line.is_empty())
            .map(|text| Paragraph { text, marker: None })
            .collect();
    }

    let mut builder = ParagraphBuilder {
        paragraphs: Vec::new(),
        buffer: String::new(),
        pending_marker: None,
        lists: Vec::new(),
    };

    let mut cursor = 0;
    for caps in tag_regex().captures_iter(html) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        builder.push_text(&html[cursor..whole.0]);
        cursor = whole.1;

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        if !is_block_tag(&name) {
            continue;
        }

        match (name.as_str(), closing) {
            ("ul", false) => {
                builder.flush();
                builder.lists.push(None);
            }
            ("ol", false) => {
                builder.flush();
                builder.lists.push(Some(0));
            }
            ("ul" | "ol", true) => {
                builder.flush();
                builder.lists.pop();
            }
            ("li", false) => builder.open_list_item(),
            _ => builder.flush(),
        }
    }
    builder.push_text(&html[cursor..]);
    builder.flush();

    builder.paragraphs
}

/// Plain-text rendering of a rich-text description, one paragraph per line.
pub fn strip_html(html: &str) -> String {
    to_paragraphs(html)
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_lines_become_paragraphs() {
        let paragraphs = to_paragraphs("First line\n\n  Second line  ");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].text, "Second line");
        assert!(paragraphs[0].marker.is_none());
    }

    #[test]
    fn test_inline_tags_are_dropped() {
        let paragraphs = to_paragraphs("<p>Led <strong>five</strong> engineers</p>");
        assert_eq!(
            paragraphs,
            vec![Paragraph {
                text: "Led five engineers".to_string(),
                marker: None
            }]
        );
    }

    #[test]
    fn test_unordered_and_ordered_lists() {
        let html = "<p>Intro</p><ul><li>One</li><li>Two</li></ul><ol><li>A</li><li>B</li></ol>";
        let paragraphs = to_paragraphs(html);
        let markers: Vec<Option<ListMarker>> =
            paragraphs.iter().map(|p| p.marker.clone()).collect();
        assert_eq!(
            markers,
            vec![
                None,
                Some(ListMarker::Bullet),
                Some(ListMarker::Bullet),
                Some(ListMarker::Numbered(1)),
                Some(ListMarker::Numbered(2)),
            ]
        );
    }

    #[test]
    fn test_br_splits_paragraph() {
        let paragraphs = to_paragraphs("<p>line one<br/>line two</p>");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].text, "line two");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(decode_entities("R&amp;D &lt;3 &#65;&#x42;"), "R&D <3 AB");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_strip_html_joins_paragraphs() {
        assert_eq!(
            strip_html("<p>Hello&nbsp;world</p><ul><li>item</li></ul>"),
            "Hello world\nitem"
        );
        assert_eq!(strip_html(""), "");
    }
}
