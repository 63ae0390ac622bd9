//! HTML document -> bounded, ordered block list.

pub mod blocks;
pub mod rich_text;

pub use blocks::Block;
pub use rich_text::{Annotations, RichTextSpan};

use once_cell::sync::OnceCell;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Default cap on blocks per document. Later content is truncated, not
/// summarized.
pub const MAX_BLOCKS: usize = 180;

fn body_selector() -> &'static Selector {
    static SEL: OnceCell<Selector> = OnceCell::new();
    SEL.get_or_init(|| Selector::parse("body").unwrap())
}

/// Convert a full HTML document (or fragment) into at most `max_blocks`
/// blocks, walking the body's direct children in document order.
pub fn html_to_blocks(html: &str, base_url: Option<&str>, max_blocks: usize) -> Vec<Block> {
    let doc = Html::parse_document(html);
    let base = base_url.and_then(|u| Url::parse(u).ok());
    let container = doc
        .select(body_selector())
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut out = Vec::new();
    for child in container.children() {
        match child.value() {
            Node::Text(t) => {
                let s: &str = &t.text;
                if !s.trim().is_empty() {
                    out.push(Block::paragraph(vec![RichTextSpan::plain(s)]));
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.extend(blocks::map_element(el, base.as_ref()));
                }
            }
            _ => {}
        }
        if out.len() >= max_blocks {
            break;
        }
    }
    // A multi-block element can overshoot the cap; the bound is hard.
    out.truncate(max_blocks);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_truncates_in_document_order() {
        let html: String = (0..300).map(|i| format!("<p>p{i}</p>")).collect();
        let blocks = html_to_blocks(&html, None, MAX_BLOCKS);
        assert_eq!(blocks.len(), MAX_BLOCKS);
        match &blocks[0] {
            Block::Paragraph { rich_text } => assert_eq!(rich_text[0].text, "p0"),
            other => panic!("expected paragraph, got {other:?}"),
        }
        match &blocks[179] {
            Block::Paragraph { rich_text } => assert_eq!(rich_text[0].text, "p179"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn cap_holds_when_last_element_is_a_list() {
        let mut html: String = (0..179).map(|i| format!("<p>p{i}</p>")).collect();
        html.push_str("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let blocks = html_to_blocks(&html, None, MAX_BLOCKS);
        assert_eq!(blocks.len(), MAX_BLOCKS);
    }

    #[test]
    fn bare_text_between_elements_becomes_paragraph() {
        let blocks = html_to_blocks("<h1>t</h1>loose text<p>p</p>", None, MAX_BLOCKS);
        assert_eq!(blocks.len(), 3);
        match &blocks[1] {
            Block::Paragraph { rich_text } => assert_eq!(rich_text[0].text, "loose text"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn base_url_threads_down_to_links_and_images() {
        let blocks = html_to_blocks(
            r#"<p><a href="a">x</a></p><img src="/img.png">"#,
            Some("https://example.com/post/"),
            MAX_BLOCKS,
        );
        match &blocks[0] {
            Block::Paragraph { rich_text } => assert_eq!(
                rich_text[0].link.as_deref(),
                Some("https://example.com/post/a")
            ),
            other => panic!("expected paragraph, got {other:?}"),
        }
        assert_eq!(
            blocks[1],
            Block::Image {
                url: "https://example.com/img.png".to_string()
            }
        );
    }
}
