//! Request routing: one of three mutually exclusive shapes is selected per
//! request from URL syntax alone.

use thiserror::Error;
use url::Url;

/// Substring marking a subject index page ("1000+ questions" hubs).
pub const SUBJECT_INDEX_MARKER: &str = "1000-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A leaf page with one question set.
    Topic(Url),
    /// An index page plus a fragment naming a section within it.
    Chapter { base: Url, fragment: String },
    /// A hub page enumerating many topics.
    SubjectIndex(Url),
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

/// Classify a request URL. A fragment always wins over the subject-index
/// marker so chapter anchors on hub pages route as chapters.
pub fn classify_url(raw: &str) -> Result<Route, RouteError> {
    let url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RouteError::UnsupportedScheme(url.scheme().to_string()));
    }

    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        let fragment = fragment.to_string();
        let mut base = url;
        base.set_fragment(None);
        return Ok(Route::Chapter { base, fragment });
    }

    if url.as_str().contains(SUBJECT_INDEX_MARKER) {
        return Ok(Route::SubjectIndex(url));
    }

    Ok(Route::Topic(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_url_is_topic() {
        let route = classify_url("https://www.sanfoundry.com/automata-theory-questions-answers/")
            .unwrap();
        assert!(matches!(route, Route::Topic(_)));
    }

    #[test]
    fn fragment_is_chapter() {
        let route =
            classify_url("https://www.sanfoundry.com/1000-automata-theory-questions/#finite")
                .unwrap();
        match route {
            Route::Chapter { base, fragment } => {
                assert_eq!(fragment, "finite");
                assert!(base.fragment().is_none());
            }
            other => panic!("expected chapter, got {other:?}"),
        }
    }

    #[test]
    fn index_marker_is_subject() {
        let route =
            classify_url("https://www.sanfoundry.com/1000-automata-theory-questions/").unwrap();
        assert!(matches!(route, Route::SubjectIndex(_)));
    }

    #[test]
    fn empty_fragment_does_not_make_a_chapter() {
        let route =
            classify_url("https://www.sanfoundry.com/1000-automata-theory-questions/#").unwrap();
        assert!(matches!(route, Route::SubjectIndex(_)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(classify_url("not a url").is_err());
        assert!(classify_url("ftp://example.com/x").is_err());
    }
}
