//! Inline HTML -> annotated rich-text spans.
//!
//! Annotations and the active link are threaded down the recursion as
//! copy-on-extend values, so sibling subtrees can never leak style into
//! each other.

use scraper::node::Node;
use scraper::ElementRef;
use url::Url;

/// Togglable text style flags plus a color value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

/// A run of text sharing one annotation set and at most one link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextSpan {
    pub text: String,
    pub annotations: Annotations,
    pub link: Option<String>,
}

impl RichTextSpan {
    /// A span with default annotations and no link. Empty content is valid:
    /// it is the placeholder for otherwise-empty blocks.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotations: Annotations::default(),
            link: None,
        }
    }
}

/// Resolve an href/src candidate to an absolute http(s) URL.
///
/// Unsafe schemes (`javascript:`, `data:`, `about:`) and bare fragments are
/// dropped. Relative references are joined against `base` when present.
pub(crate) fn resolve_url(candidate: &str, base: Option<&Url>) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.starts_with('#') {
        return None;
    }
    let lower = candidate.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("data:") || lower.starts_with("about:")
    {
        return None;
    }
    let resolved = match base {
        Some(b) => b.join(candidate).ok()?,
        None => Url::parse(candidate).ok()?,
    };
    if matches!(resolved.scheme(), "http" | "https") && resolved.has_host() {
        Some(String::from(resolved))
    } else {
        None
    }
}

/// Convert the inline content of `el` into an ordered span sequence.
///
/// Entry point for block-level elements: the element's own tag contributes
/// no annotation unless it happens to be an inline style tag itself.
pub fn build_rich_text(el: ElementRef, base: Option<&Url>) -> Vec<RichTextSpan> {
    let mut out = Vec::new();
    walk(el, &Annotations::default(), None, base, &mut out);
    out
}

fn walk(
    el: ElementRef,
    inherited: &Annotations,
    link: Option<&str>,
    base: Option<&Url>,
    out: &mut Vec<RichTextSpan>,
) {
    let tag = el.value().name();

    if tag == "br" {
        out.push(RichTextSpan {
            text: "\n".to_string(),
            annotations: inherited.clone(),
            link: None,
        });
        return;
    }

    let mut ann = inherited.clone();
    match tag {
        "b" | "strong" => ann.bold = true,
        "i" | "em" => ann.italic = true,
        "code" => ann.code = true,
        "s" | "del" => ann.strikethrough = true,
        "u" => ann.underline = true,
        _ => {}
    }

    // An anchor replaces the inherited link for its whole subtree; a target
    // that fails resolution reverts the subtree to no-link.
    let resolved;
    let link = if tag == "a" {
        resolved = el
            .value()
            .attr("href")
            .and_then(|href| resolve_url(href, base));
        resolved.as_deref()
    } else {
        link
    };

    for child in el.children() {
        match child.value() {
            Node::Text(t) => {
                let s: &str = &t.text;
                if s.is_empty() {
                    continue;
                }
                out.push(RichTextSpan {
                    text: s.to_string(),
                    annotations: ann.clone(),
                    link: link.map(str::to_string),
                });
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    walk(child_el, &ann, link, base, out);
                }
            }
            _ => {}
        }
    }
}
