//! Image classification and inline embedding.
//!
//! The scraped pages carry two very different kinds of `<img>`: full
//! diagrams (circuit drawings, automata graphs) and tiny rendered math
//! glyphs inlined mid-sentence. Both are re-embedded as base64 data URIs so
//! the rendered PDF has no external references; the classification decides
//! the layout treatment.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use crate::fetcher;

/// A diagram is enlarged and block-level; anything at or below these bounds
/// renders as an inline glyph.
const DIAGRAM_MIN_WIDTH: u32 = 50;
const DIAGRAM_MIN_HEIGHT: u32 = 40;
const DIAGRAM_MIN_ENCODED_LEN: usize = 5000;

/// Diagrams are forced up to at least this rendered width.
const DIAGRAM_FLOOR_WIDTH: u32 = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Diagram,
    MathGlyph,
}

/// One image discovered during the structural pass, waiting to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Absolute, query-stripped source URL.
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// A fetched, encoded, classified image ready to substitute into the draft.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub data_uri: String,
    pub kind: ImageKind,
    /// Rendered width for diagrams; `None` for glyphs.
    pub render_width: Option<u32>,
}

/// Size-based heuristic: declared dimensions first, encoded payload length
/// as the tie-breaker when dimensions are absent (both zero).
pub fn classify_image(width: u32, height: u32, encoded_len: usize) -> ImageKind {
    if width > DIAGRAM_MIN_WIDTH || height > DIAGRAM_MIN_HEIGHT || encoded_len > DIAGRAM_MIN_ENCODED_LEN
    {
        ImageKind::Diagram
    } else {
        ImageKind::MathGlyph
    }
}

/// Normalize a raw `src`-ish attribute into an absolute, fetchable URL.
///
/// Handles site-relative paths, protocol-relative URLs, srcset remnants
/// ("a.png 2x, b.png 1x"), and query strings (cache busters confuse the
/// image CDN when replayed without cookies).
pub fn normalize_image_src(raw: &str, origin: &str) -> Option<String> {
    let trimmed = raw.trim();
    // Data URIs carry a comma before the payload; the srcset split below
    // would truncate them.
    if trimmed.starts_with("data:") {
        return Some(trimmed.to_string());
    }
    let first = raw.split(',').next()?.trim();
    let first = first.split_whitespace().next()?;
    if first.is_empty() {
        return None;
    }
    let no_query = match first.find('?') {
        Some(idx) => &first[..idx],
        None => first,
    };
    if no_query.starts_with("//") {
        return Some(format!("https:{no_query}"));
    }
    if no_query.starts_with('/') {
        return Some(format!("{}{}", origin.trim_end_matches('/'), no_query));
    }
    if no_query.starts_with("http://") || no_query.starts_with("https://") {
        return Some(no_query.to_string());
    }
    None
}

/// Fetch, encode, and classify every pending image, sequentially.
///
/// Failures are logged and omitted from the map; the caller drops the
/// corresponding `<img>` node rather than failing the page.
pub async fn resolve_images(
    requests: &[ImageRequest],
    referer: &str,
) -> HashMap<String, EmbeddedImage> {
    let mut resolved = HashMap::new();
    for request in requests {
        if resolved.contains_key(&request.src) {
            continue;
        }
        // Already-inline images skip the network round trip.
        if request.src.starts_with("data:") {
            let kind = classify_image(request.width, request.height, request.src.len());
            resolved.insert(
                request.src.clone(),
                embedded(request, request.src.clone(), kind),
            );
            continue;
        }
        match fetcher::fetch_image(&request.src, referer).await {
            Ok(image) => {
                let encoded = BASE64.encode(&image.bytes);
                let data_uri = format!("data:{};base64,{}", image.content_type, encoded);
                let kind = classify_image(request.width, request.height, encoded.len());
                debug!(src = %request.src, ?kind, "embedded image");
                resolved.insert(request.src.clone(), embedded(request, data_uri, kind));
            }
            Err(err) => {
                warn!(src = %request.src, error = %err, "image fetch failed, omitting");
            }
        }
    }
    resolved
}

fn embedded(request: &ImageRequest, data_uri: String, kind: ImageKind) -> EmbeddedImage {
    let render_width = match kind {
        ImageKind::Diagram => Some(request.width.max(DIAGRAM_FLOOR_WIDTH)),
        ImageKind::MathGlyph => None,
    };
    EmbeddedImage {
        data_uri,
        kind,
        render_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_is_diagram() {
        assert_eq!(classify_image(51, 0, 0), ImageKind::Diagram);
    }

    #[test]
    fn tall_image_is_diagram() {
        assert_eq!(classify_image(0, 41, 0), ImageKind::Diagram);
    }

    #[test]
    fn large_payload_dominates_when_dimensions_unknown() {
        assert_eq!(classify_image(0, 0, 6000), ImageKind::Diagram);
    }

    #[test]
    fn small_everything_is_math_glyph() {
        assert_eq!(classify_image(50, 40, 5000), ImageKind::MathGlyph);
        assert_eq!(classify_image(0, 0, 0), ImageKind::MathGlyph);
    }

    #[test]
    fn normalize_site_relative() {
        assert_eq!(
            normalize_image_src("/wp-content/x.png", "https://www.sanfoundry.com"),
            Some("https://www.sanfoundry.com/wp-content/x.png".to_string())
        );
    }

    #[test]
    fn normalize_strips_query_and_srcset() {
        assert_eq!(
            normalize_image_src(
                "https://cdn.example.com/a.png?ver=2 2x, https://cdn.example.com/b.png 1x",
                "https://www.sanfoundry.com"
            ),
            Some("https://cdn.example.com/a.png".to_string())
        );
    }

    #[test]
    fn normalize_protocol_relative() {
        assert_eq!(
            normalize_image_src("//cdn.example.com/a.gif", "https://www.sanfoundry.com"),
            Some("https://cdn.example.com/a.gif".to_string())
        );
    }

    #[test]
    fn normalize_keeps_data_uri_payload_intact() {
        let uri = "data:image/png;base64,AAAABBBB";
        assert_eq!(
            normalize_image_src(uri, "https://s.com"),
            Some(uri.to_string())
        );
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert_eq!(normalize_image_src("", "https://s.com"), None);
        assert_eq!(normalize_image_src("   ", "https://s.com"), None);
        assert_eq!(normalize_image_src("javascript:alert(1)", "https://s.com"), None);
    }
}
