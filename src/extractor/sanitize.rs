//! Block-level markup sanitation.
//!
//! Each classified block goes through a structural pass (kuchiki DOM
//! mutation) that strips interactive widgets, unwraps links, normalizes
//! image sources, and scrubs raw URLs out of visible text. A final ammonia
//! pass removes anything script-shaped that survived. The passes are
//! idempotent: sanitizing already-sanitized markup is a no-op.

use std::collections::HashMap;

use ammonia::Builder;
use html5ever::{QualName, local_name, namespace_url, ns};
use kuchiki::traits::TendrilSink;
use kuchiki::iter::NodeIterator;
use kuchiki::{Attribute, ExpandedName, NodeDataRef, NodeRef};
use linkify::{LinkFinder, LinkKind};
use once_cell::sync::Lazy;

use crate::extractor::classify::COLLAPSE_TOGGLE_MARKER;
use crate::extractor::images::{EmbeddedImage, ImageKind, ImageRequest, normalize_image_src};

static CLEANER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .add_generic_attributes(["class", "style"])
        .add_tag_attributes("img", ["src", "width", "height"])
        .url_schemes(["http", "https", "data"].into_iter().collect())
        .link_rel(None);
    builder
});

/// Final cleaning pass over assembled fragment HTML. Keeps the semantic
/// class attributes and data-URI images the pipeline produces.
pub fn clean_html(html: &str) -> String {
    CLEANER.clean(html).to_string()
}

/// Minimal text escaping for interpolating extracted titles into markup.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Parse a markup fragment into a DOM rooted at `<body>`.
pub fn parse_fragment(html: &str) -> NodeRef {
    let document = kuchiki::parse_html().one(html);
    match document.select_first("body") {
        Ok(body) => body.as_node().clone(),
        Err(()) => document,
    }
}

/// Serialize a node's children back to markup.
pub fn inner_html(node: &NodeRef) -> String {
    let mut out = Vec::new();
    for child in node.children() {
        // Serialization into a Vec cannot fail.
        let _ = child.serialize(&mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Structural sanitation of one block, in order: noscript unwrapping, link
/// unwrapping, image source normalization (recording fetch requests into
/// `images`), expand/collapse toggle removal, raw-URL scrubbing.
///
/// Malformed sub-fragments are tolerated; every step degrades to a no-op.
pub fn sanitize_block(block: &NodeRef, origin: &str, images: &mut Vec<ImageRequest>) {
    unwrap_noscript(block);
    unwrap_links(block);
    normalize_images(block, origin, images);
    remove_collapse_toggles(block);
    strip_inline_urls(block);
}

/// Replace every `<noscript>` with its own inner markup so content hidden
/// behind a no-script guard becomes visible.
fn unwrap_noscript(block: &NodeRef) {
    for noscript in collect(block, "noscript") {
        let node = noscript.as_node();
        let has_element_children = node.children().elements().next().is_some();
        if has_element_children {
            // Parsed with scripting disabled: children are real elements.
            for child in node.children().collect::<Vec<_>>() {
                node.insert_before(child);
            }
        } else {
            // Standard parse: the payload is one raw text node of markup.
            let raw = node.text_contents();
            for child in parse_fragment(&raw).children().collect::<Vec<_>>() {
                node.insert_before(child);
            }
        }
        node.detach();
    }
}

/// Unwrap hyperlinks: text survives, the anchor does not. Relative and dead
/// links have no place in a rendered PDF.
fn unwrap_links(block: &NodeRef) {
    for anchor in collect(block, "a") {
        let node = anchor.as_node();
        let text = node.text_contents();
        if !text.trim().is_empty() {
            node.insert_before(NodeRef::new_text(text));
        }
        node.detach();
    }
}

/// Rewrite each `<img>` to its normalized absolute source, preferring the
/// lazy-load attribute over the primary one, and record a fetch request.
/// Images with no usable source are removed outright.
fn normalize_images(block: &NodeRef, origin: &str, images: &mut Vec<ImageRequest>) {
    for img in collect(block, "img") {
        let node = img.as_node();
        let (raw, width, height) = {
            let attrs = img.attributes.borrow();
            let raw = attrs
                .get("data-src")
                .or_else(|| attrs.get("src"))
                .or_else(|| attrs.get("data-lazy-src"))
                .map(str::to_string);
            let width = parse_dimension(attrs.get("width"));
            let height = parse_dimension(attrs.get("height"));
            (raw, width, height)
        };
        match raw.and_then(|r| normalize_image_src(&r, origin)) {
            Some(src) => {
                let mut attrs = img.attributes.borrow_mut();
                attrs.insert("src", src.clone());
                attrs.remove("data-src");
                attrs.remove("data-lazy-src");
                attrs.remove("srcset");
                images.push(ImageRequest { src, width, height });
            }
            None => node.detach(),
        }
    }
}

/// Remove leftover expand/collapse controls. Their content was already
/// force-expanded in the browser before extraction.
fn remove_collapse_toggles(block: &NodeRef) {
    let selector = format!("[class*=\"{COLLAPSE_TOGGLE_MARKER}\"]");
    for toggle in collect(block, &selector) {
        let node = toggle.as_node();
        if node == block {
            // kuchiki's select is inclusive; never remove the block itself.
            continue;
        }
        node.detach();
    }
}

/// Scrub literal URL substrings leaking into visible text (the source site
/// drops raw tracking links into some paragraphs).
fn strip_inline_urls(block: &NodeRef) {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    for text_node in block.inclusive_descendants().text_nodes() {
        let stripped = {
            let text = text_node.borrow();
            remove_link_spans(&finder, &text)
        };
        let mut text = text_node.borrow_mut();
        if stripped != *text {
            *text = stripped;
        }
    }
}

fn remove_link_spans(finder: &LinkFinder, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for link in finder.links(text) {
        out.push_str(&text[cursor..link.start()]);
        cursor = link.end();
    }
    out.push_str(&text[cursor..]);
    out
}

/// Substitute every `<img>` in the draft with its embedded counterpart, or
/// drop it when the fetch failed. Runs after `resolve_images`.
pub fn substitute_images(root: &NodeRef, resolved: &HashMap<String, EmbeddedImage>) {
    for img in collect(root, "img") {
        let node = img.as_node();
        let src = img.attributes.borrow().get("src").map(str::to_string);
        let embedded = src.as_deref().and_then(|s| resolved.get(s));
        match embedded {
            Some(image) => {
                node.insert_before(build_embedded_img(image));
                node.detach();
            }
            None => node.detach(),
        }
    }
}

fn build_embedded_img(image: &EmbeddedImage) -> NodeRef {
    let mut attributes = vec![attr("src", image.data_uri.clone())];
    match image.kind {
        ImageKind::Diagram => {
            attributes.push(attr("class", "diagram".to_string()));
            if let Some(width) = image.render_width {
                attributes.push(attr("style", format!("width: {width}px;")));
            }
        }
        ImageKind::MathGlyph => {
            attributes.push(attr("class", "math-img".to_string()));
        }
    }
    NodeRef::new_element(
        QualName::new(None, ns!(html), local_name!("img")),
        attributes,
    )
}

fn attr(name: &str, value: String) -> (ExpandedName, Attribute) {
    (
        ExpandedName::new(ns!(), name),
        Attribute {
            prefix: None,
            value,
        },
    )
}

fn parse_dimension(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

fn collect(node: &NodeRef, selector: &str) -> Vec<NodeDataRef<kuchiki::ElementData>> {
    node.select(selector)
        .map(|matches| matches.collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize_str(html: &str) -> (String, Vec<ImageRequest>) {
        let root = parse_fragment(html);
        let mut images = Vec::new();
        sanitize_block(&root, "https://www.sanfoundry.com", &mut images);
        (inner_html(&root), images)
    }

    #[test]
    fn links_are_unwrapped_to_text() {
        let (html, _) = sanitize_str(r#"<p>see <a href="/other">this page</a> now</p>"#);
        assert!(!html.contains("<a"));
        assert!(html.contains("see this page now"));
    }

    #[test]
    fn noscript_payload_becomes_visible() {
        let (html, images) =
            sanitize_str(r#"<p><noscript><img src="/pic.png" width="80"></noscript></p>"#);
        assert!(!html.contains("noscript"));
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].src, "https://www.sanfoundry.com/pic.png");
        assert_eq!(images[0].width, 80);
    }

    #[test]
    fn lazy_source_takes_priority() {
        let (html, images) = sanitize_str(
            r#"<img data-src="/lazy.png" src="/eager.png" width="10" height="10">"#,
        );
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].src, "https://www.sanfoundry.com/lazy.png");
        assert!(html.contains("lazy.png"));
        assert!(!html.contains("eager.png"));
    }

    #[test]
    fn sourceless_image_is_removed() {
        let (html, images) = sanitize_str(r#"<p>before <img alt="x"> after</p>"#);
        assert!(images.is_empty());
        assert!(!html.contains("<img"));
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn collapse_toggles_are_removed() {
        let (html, _) = sanitize_str(
            r#"<div><span class="collapseomatic" id="t1">View Answer</span><b>kept</b></div>"#,
        );
        assert!(!html.contains("collapseomatic"));
        assert!(html.contains("kept"));
    }

    #[test]
    fn block_with_marker_class_survives_toggle_removal() {
        let root = parse_fragment(r#"<div class="collapseomatic_content">Answer: a</div>"#);
        let block = root.select_first("div").unwrap().as_node().clone();
        let mut images = Vec::new();
        sanitize_block(&block, "https://www.sanfoundry.com", &mut images);
        assert!(inner_html(&root).contains("Answer: a"));
    }

    #[test]
    fn raw_urls_are_scrubbed_from_text() {
        let (html, _) = sanitize_str("<p>visit https://tracking.example.com/p?id=1 for more</p>");
        assert!(!html.contains("tracking.example.com"));
        assert!(html.contains("visit"));
        assert!(html.contains("for more"));
    }

    #[test]
    fn sanitization_is_idempotent() {
        let input = r#"<p>1. What? <a href="/x">link</a> https://leak.example.com <noscript><b>hi</b></noscript></p>"#;
        let (once, _) = sanitize_str(input);
        let (twice, _) = sanitize_str(&once);
        assert_eq!(once, twice);
        let (thrice, _) = sanitize_str(&twice);
        assert_eq!(twice, thrice);
    }

    #[test]
    fn substitute_replaces_and_drops() {
        let root = parse_fragment(
            r#"<p><img src="https://s.com/a.png"><img src="https://s.com/missing.png"></p>"#,
        );
        let mut resolved = HashMap::new();
        resolved.insert(
            "https://s.com/a.png".to_string(),
            EmbeddedImage {
                data_uri: "data:image/png;base64,AAAA".to_string(),
                kind: ImageKind::Diagram,
                render_width: Some(350),
            },
        );
        substitute_images(&root, &resolved);
        let html = inner_html(&root);
        assert!(html.contains("data:image/png;base64,AAAA"));
        assert!(html.contains("class=\"diagram\""));
        assert!(html.contains("width: 350px;"));
        assert!(!html.contains("missing.png"));
    }

    #[test]
    fn clean_html_drops_scripts_keeps_classes() {
        let cleaned = clean_html(
            r#"<div class="question">1. X?<script>alert(1)</script><img src="data:image/png;base64,AA" class="math-img"></div>"#,
        );
        assert!(!cleaned.contains("script"));
        assert!(cleaned.contains("class=\"question\""));
        assert!(cleaned.contains("data:image/png;base64,AA"));
    }
}
