//! Block-level HTML -> document blocks.
//!
//! A closed set of block variants with a tag-dispatched mapper; container
//! elements recurse and their results are concatenated in document order.

use scraper::node::Node;
use scraper::ElementRef;
use url::Url;

use super::rich_text::{build_rich_text, resolve_url, RichTextSpan};

/// One structural unit of the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// 1..=3
        level: u8,
        rich_text: Vec<RichTextSpan>,
    },
    Paragraph {
        rich_text: Vec<RichTextSpan>,
    },
    ListItem {
        ordered: bool,
        rich_text: Vec<RichTextSpan>,
    },
    Quote {
        rich_text: Vec<RichTextSpan>,
    },
    Code {
        text: String,
    },
    Image {
        /// External URL reference only; images are never re-hosted.
        url: String,
    },
}

/// The remote schema rejects empty rich-text arrays, so empty sequences are
/// normalized to a single empty-content span at construction.
fn non_empty(spans: Vec<RichTextSpan>) -> Vec<RichTextSpan> {
    if spans.is_empty() {
        vec![RichTextSpan::plain("")]
    } else {
        spans
    }
}

impl Block {
    pub fn heading(level: u8, spans: Vec<RichTextSpan>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            rich_text: non_empty(spans),
        }
    }

    pub fn paragraph(spans: Vec<RichTextSpan>) -> Self {
        Block::Paragraph {
            rich_text: non_empty(spans),
        }
    }

    pub fn list_item(ordered: bool, spans: Vec<RichTextSpan>) -> Self {
        Block::ListItem {
            ordered,
            rich_text: non_empty(spans),
        }
    }

    pub fn quote(spans: Vec<RichTextSpan>) -> Self {
        Block::Quote {
            rich_text: non_empty(spans),
        }
    }
}

/// Map a block-level element to zero, one, or many blocks.
pub fn map_element(el: ElementRef, base: Option<&Url>) -> Vec<Block> {
    match el.value().name() {
        "h1" => vec![Block::heading(1, build_rich_text(el, base))],
        "h2" => vec![Block::heading(2, build_rich_text(el, base))],
        "h3" => vec![Block::heading(3, build_rich_text(el, base))],
        "p" => vec![Block::paragraph(build_rich_text(el, base))],
        "ul" | "ol" => map_list(el, base),
        "blockquote" => vec![Block::quote(build_rich_text(el, base))],
        "pre" => {
            let text = el.text().collect::<Vec<_>>().join("\n");
            vec![Block::Code { text }]
        }
        "img" => match el.value().attr("src").and_then(|src| resolve_url(src, base)) {
            Some(url) => vec![Block::Image { url }],
            // Invalid image URLs are dropped, not replaced.
            None => Vec::new(),
        },
        "div" | "section" | "article" | "main" => map_container(el, base),
        _ => {
            // Fallback: a single paragraph from the element's rich text, or
            // its plain text when rich-text extraction yields nothing.
            let spans = build_rich_text(el, base);
            if spans.is_empty() {
                let text = el.text().collect::<String>();
                vec![Block::paragraph(vec![RichTextSpan::plain(text)])]
            } else {
                vec![Block::paragraph(spans)]
            }
        }
    }
}

/// One list-item block per direct child `<li>`; deeper descendants belong to
/// the item's own rich text and are not flattened across levels.
fn map_list(el: ElementRef, base: Option<&Url>) -> Vec<Block> {
    let ordered = el.value().name() == "ol";
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(|li| Block::list_item(ordered, build_rich_text(li, base)))
        .collect()
}

/// Flatten a generic container: bare text becomes standalone paragraphs,
/// child elements recurse through the mapper.
fn map_container(el: ElementRef, base: Option<&Url>) -> Vec<Block> {
    let mut blocks = Vec::new();
    for child in el.children() {
        match child.value() {
            Node::Text(t) => {
                let s: &str = &t.text;
                if !s.trim().is_empty() {
                    blocks.push(Block::paragraph(vec![RichTextSpan::plain(s)]));
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    blocks.extend(map_element(child_el, base));
                }
            }
            _ => {}
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first_mapped(html: &str, selector: &str) -> Vec<Block> {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse(selector).unwrap();
        let el = doc.select(&sel).next().expect("selector matches");
        map_element(el, None)
    }

    #[test]
    fn headings_carry_their_level() {
        let blocks = first_mapped("<h2>Title</h2>", "h2");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Heading { level, rich_text } => {
                assert_eq!(*level, 2);
                assert_eq!(rich_text[0].text, "Title");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn lists_yield_one_item_per_direct_child() {
        let blocks = first_mapped(
            "<ol><li>a</li><li>b<ul><li>nested</li></ul></li></ol>",
            "ol",
        );
        assert_eq!(blocks.len(), 2);
        for b in &blocks {
            match b {
                Block::ListItem { ordered, .. } => assert!(*ordered),
                other => panic!("expected list item, got {other:?}"),
            }
        }
    }

    #[test]
    fn pre_becomes_plain_code_block() {
        let blocks = first_mapped("<pre>let x = 1;\nlet y = 2;</pre>", "pre");
        match &blocks[0] {
            Block::Code { text } => assert!(text.contains("let x = 1;")),
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn image_with_bad_src_is_dropped() {
        assert!(first_mapped(r#"<img src="javascript:x">"#, "img").is_empty());
        let ok = first_mapped(r#"<img src="https://example.com/a.png">"#, "img");
        assert_eq!(
            ok,
            vec![Block::Image {
                url: "https://example.com/a.png".to_string()
            }]
        );
    }

    #[test]
    fn containers_flatten_children_in_order() {
        let blocks = first_mapped(
            "<div>intro<p>one</p><div><p>two</p></div></div>",
            "div",
        );
        assert_eq!(blocks.len(), 3);
        match &blocks[0] {
            Block::Paragraph { rich_text } => assert_eq!(rich_text[0].text, "intro"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn empty_paragraph_gets_placeholder_span() {
        let blocks = first_mapped("<p></p>", "p");
        match &blocks[0] {
            Block::Paragraph { rich_text } => {
                assert_eq!(rich_text.len(), 1);
                assert_eq!(rich_text[0].text, "");
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn blockquote_flattens_to_quote_text() {
        let blocks = first_mapped("<blockquote><p>wise words</p></blockquote>", "blockquote");
        match &blocks[0] {
            Block::Quote { rich_text } => assert_eq!(rich_text[0].text, "wise words"),
            other => panic!("expected quote, got {other:?}"),
        }
    }
}
