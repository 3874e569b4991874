//! Per-topic extraction pipeline.
//!
//! A topic page goes through three phases. The structural pass
//! ([`extract_topic`]) parses the page, classifies each top-level content
//! block, sanitizes it, and records which images still need fetching. The
//! image pass ([`images::resolve_images`]) fetches and encodes those
//! sequentially. The finishing pass ([`finalize_topic`]) splices embedded
//! images into the draft and wraps everything under the topic header.
//!
//! All DOM work is confined to the two synchronous passes; nothing
//! reference-counted crosses an await point.

pub mod classify;
pub mod images;
pub mod model;
pub mod sanitize;

pub use model::{TopicDraft, TopicOutcome, TopicResult};

use std::collections::HashMap;

use kuchiki::NodeRef;
use kuchiki::iter::NodeIterator;
use kuchiki::traits::TendrilSink;
use tracing::{debug, instrument};

use classify::BlockTag;
use images::EmbeddedImage;
use sanitize::{clean_html, inner_html, parse_fragment, sanitize_block, substitute_images};

/// Fallback header when the page carries no `<h1>`.
const DEFAULT_TOPIC_TITLE: &str = "Topic";

/// The site's main content container.
const CONTENT_CONTAINER_SELECTOR: &str = "div.entry-content";

/// Full pipeline for one topic page: structural pass, sequential image
/// resolution, finish.
#[instrument(skip_all)]
pub async fn extract(raw_html: &str, origin: &str) -> TopicResult {
    let draft = extract_topic(raw_html, origin);
    let resolved = images::resolve_images(&draft.images, origin).await;
    finalize_topic(draft, &resolved)
}

/// Structural pass. Only the content container's direct `<p>`/`<div>`
/// children are considered; descending further would re-classify nested
/// structures that already belong to a block.
///
/// A page without a recognizable content container yields an empty draft
/// rather than an error; the batch must tolerate empty contributions.
pub fn extract_topic(raw_html: &str, origin: &str) -> TopicDraft {
    let document = kuchiki::parse_html().one(raw_html);

    let title = document
        .select_first("h1")
        .map(|h| h.text_contents().trim().to_string())
        .ok()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC_TITLE.to_string());

    let Ok(container) = document.select_first(CONTENT_CONTAINER_SELECTOR) else {
        debug!("no content container found, topic yields empty draft");
        return TopicDraft {
            title,
            html: String::new(),
            images: Vec::new(),
            blocks: 0,
        };
    };

    let mut html = String::new();
    let mut images = Vec::new();
    let mut blocks = 0;

    let children: Vec<NodeRef> = container
        .as_node()
        .children()
        .elements()
        .filter(|el| matches!(&*el.name.local, "p" | "div"))
        .map(|el| el.as_node().clone())
        .collect();

    for child in children {
        let text = child.text_contents();
        let classes = element_classes(&child);
        let class_refs: Vec<&str> = classes.iter().map(String::as_str).collect();

        let Some(tag) = classify::classify_block(&text, &class_refs) else {
            continue;
        };

        match tag {
            BlockTag::Question => {
                sanitize_block(&child, origin, &mut images);
                html.push_str(&format!(
                    "<div class=\"question\">Q. {}</div>",
                    inner_html(&child)
                ));
            }
            BlockTag::Option => {
                sanitize_block(&child, origin, &mut images);
                html.push_str(&format!("<div class=\"option\">{}</div>", inner_html(&child)));
            }
            BlockTag::Answer => {
                let letter = classify::answer_letter(&text);
                let body = classify::explanation_body(&inner_html(&child)).to_string();
                let fragment = parse_fragment(&body);
                sanitize_block(&fragment, origin, &mut images);
                html.push_str(&format!(
                    "<div class=\"ans-block\"><span class=\"ans-label\">Answer: {}</span>{}</div>",
                    letter,
                    inner_html(&fragment)
                ));
            }
        }
        blocks += 1;
    }

    TopicDraft {
        title,
        html,
        images,
        blocks,
    }
}

/// Finishing pass: substitute embedded images, run the cleaning pass, and
/// prepend the topic header.
pub fn finalize_topic(
    draft: TopicDraft,
    resolved: &HashMap<String, EmbeddedImage>,
) -> TopicResult {
    let header = format!(
        "<h2 class=\"topic-header\">{}</h2>",
        sanitize::escape_text(&draft.title)
    );

    if draft.blocks == 0 {
        return TopicResult {
            title: draft.title,
            html: header,
            outcome: TopicOutcome::Empty,
        };
    }

    let root = parse_fragment(&draft.html);
    substitute_images(&root, resolved);
    let body = clean_html(&inner_html(&root));

    TopicResult {
        title: draft.title,
        html: format!("{header}{body}"),
        outcome: TopicOutcome::Extracted {
            blocks: draft.blocks,
        },
    }
}

fn element_classes(node: &NodeRef) -> Vec<String> {
    node.as_element()
        .and_then(|el| {
            el.attributes
                .borrow()
                .get("class")
                .map(|c| c.split_whitespace().map(str::to_string).collect())
        })
        .unwrap_or_default()
}
