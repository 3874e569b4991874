//! Pure link-set resolution over raw index-page markup. No browser, no
//! network; everything here is testable with string fixtures.

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;
use regex::Regex;
use url::Url;

/// A located chapter section: its display title and the topic links listed
/// in the first table/list following the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSection {
    pub title: String,
    pub links: Vec<Url>,
}

const DEFAULT_CHAPTER_TITLE: &str = "Chapter";

/// Locate a chapter anchor in an index page and collect its topic links.
///
/// Target lookup strategies, first match wins:
/// 1. exact id match,
/// 2. partial id match (fragment appears anywhere in an id),
/// 3. heading text match, with `-`/`_` separators normalized to spaces.
///
/// Returns `None` when no strategy finds a target.
pub fn resolve_chapter(raw_html: &str, fragment: &str, base: &Url) -> Option<ChapterSection> {
    let document = kuchiki::parse_html().one(raw_html);

    let target = find_by_exact_id(&document, fragment)
        .or_else(|| find_by_partial_id(&document, fragment))
        .or_else(|| find_by_heading_text(&document, fragment))?;

    // Anchor spans are usually empty; the chapter's display title then comes
    // from the heading that follows the anchor.
    let title = Some(target.text_contents().trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            find_next_matching(&target, &["h2", "h3", "h4"])
                .map(|h| h.text_contents().trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_CHAPTER_TITLE.to_string());

    let links = find_next_matching(&target, &["table", "ul"])
        .map(|listing| collect_links(&listing, base))
        .unwrap_or_default();

    Some(ChapterSection { title, links })
}

fn find_by_exact_id(document: &NodeRef, fragment: &str) -> Option<NodeRef> {
    elements_with_id(document)
        .find(|(_, id)| id == fragment)
        .map(|(node, _)| node)
}

fn find_by_partial_id(document: &NodeRef, fragment: &str) -> Option<NodeRef> {
    let pattern = Regex::new(&regex::escape(fragment)).ok()?;
    elements_with_id(document)
        .find(|(_, id)| pattern.is_match(id))
        .map(|(node, _)| node)
}

fn find_by_heading_text(document: &NodeRef, fragment: &str) -> Option<NodeRef> {
    let wanted = normalize_separators(fragment).to_lowercase();
    let headings = document.select("h2, h3, h4").ok()?;
    for heading in headings {
        let text = heading.text_contents().trim().to_lowercase();
        if normalize_separators(&text) == wanted {
            return Some(heading.as_node().clone());
        }
    }
    None
}

fn elements_with_id(document: &NodeRef) -> impl Iterator<Item = (NodeRef, String)> {
    document
        .inclusive_descendants()
        .filter_map(|node| {
            let id = node
                .as_element()?
                .attributes
                .borrow()
                .get("id")
                .map(str::to_string)?;
            Some((node.clone(), id))
        })
        .collect::<Vec<_>>()
        .into_iter()
}

fn normalize_separators(text: &str) -> String {
    text.split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element with one of `names` after `start` in document order,
/// descendants of following siblings included.
fn find_next_matching(start: &NodeRef, names: &[&str]) -> Option<NodeRef> {
    for node in start.descendants() {
        if element_named(&node, names) {
            return Some(node);
        }
    }
    let mut cursor = start.clone();
    loop {
        if let Some(sibling) = cursor.next_sibling() {
            for node in sibling.inclusive_descendants() {
                if element_named(&node, names) {
                    return Some(node);
                }
            }
            cursor = sibling;
        } else if let Some(parent) = cursor.parent() {
            cursor = parent;
        } else {
            return None;
        }
    }
}

fn element_named(node: &NodeRef, names: &[&str]) -> bool {
    node.as_element()
        .map(|el| names.iter().any(|n| *n == &*el.name.local))
        .unwrap_or(false)
}

fn collect_links(listing: &NodeRef, base: &Url) -> Vec<Url> {
    let Ok(anchors) = listing.select("a[href]") else {
        return Vec::new();
    };
    anchors
        .filter_map(|a| {
            let href = a.attributes.borrow().get("href").map(str::to_string)?;
            base.join(&href).ok()
        })
        .collect()
}

/// Same-site, fragment-free topic links within a subject index page's main
/// content area, capped to a fixed prefix for resource stability.
pub fn collect_subject_links(raw_html: &str, base: &Url, cap: usize) -> Vec<Url> {
    let document = kuchiki::parse_html().one(raw_html);
    let Ok(container) = document.select_first("div.entry-content") else {
        return Vec::new();
    };
    let Ok(anchors) = container.as_node().select("a[href]") else {
        return Vec::new();
    };
    let site_host = base.host_str().map(str::to_string);
    anchors
        .filter_map(|a| {
            let href = a.attributes.borrow().get("href").map(str::to_string)?;
            if href.contains('#') {
                return None;
            }
            let url = base.join(&href).ok()?;
            if url.host_str().map(str::to_string) != site_host {
                return None;
            }
            Some(url)
        })
        .take(cap)
        .collect()
}

/// The page's primary heading.
pub fn first_heading(raw_html: &str) -> Option<String> {
    let document = kuchiki::parse_html().one(raw_html);
    document
        .select_first("h1")
        .ok()
        .map(|h| h.text_contents().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Last link text of the breadcrumb trail, used as the subject title on
/// topic pages.
pub fn breadcrumb_subject(raw_html: &str) -> Option<String> {
    let document = kuchiki::parse_html().one(raw_html);
    let anchors = document.select("[class*=\"breadcrumb\"] a").ok()?;
    anchors
        .last()
        .map(|a| a.text_contents().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.sanfoundry.com/1000-automata-theory-questions/").unwrap()
    }

    const INDEX_PAGE: &str = r#"
        <html><body><h1>Automata Theory Questions and Answers</h1>
        <div class="entry-content">
            <span id="finite-automata"></span>
            <h2>Finite Automata</h2>
            <table>
                <tr><td><a href="/automata-questions-dfa/">DFA</a></td></tr>
                <tr><td><a href="/automata-questions-nfa/">NFA</a></td></tr>
            </table>
            <span id="pushdown"></span>
            <h2>Pushdown Automata</h2>
            <ul><li><a href="/automata-questions-pda/">PDA</a></li></ul>
        </div></body></html>
    "#;

    #[test]
    fn exact_id_wins() {
        let section = resolve_chapter(INDEX_PAGE, "finite-automata", &base()).unwrap();
        assert_eq!(section.title, "Finite Automata");
        assert_eq!(
            section.links.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec![
                "https://www.sanfoundry.com/automata-questions-dfa/",
                "https://www.sanfoundry.com/automata-questions-nfa/",
            ]
        );
    }

    #[test]
    fn partial_id_matches_when_exact_fails() {
        let section = resolve_chapter(INDEX_PAGE, "finite", &base()).unwrap();
        assert_eq!(section.links.len(), 2);
    }

    #[test]
    fn heading_text_matches_with_normalized_separators() {
        let section = resolve_chapter(INDEX_PAGE, "pushdown-automata", &base()).unwrap();
        assert_eq!(section.title, "Pushdown Automata");
        assert_eq!(
            section.links[0].as_str(),
            "https://www.sanfoundry.com/automata-questions-pda/"
        );
    }

    #[test]
    fn unresolvable_fragment_is_none() {
        assert!(resolve_chapter(INDEX_PAGE, "no-such-chapter", &base()).is_none());
    }

    #[test]
    fn anchor_without_listing_yields_no_links() {
        let html = r#"<html><body><span id="lonely"></span><p>nothing follows</p></body></html>"#;
        let section = resolve_chapter(html, "lonely", &base()).unwrap();
        assert!(section.links.is_empty());
    }

    #[test]
    fn subject_links_filter_and_cap() {
        let html = r#"
            <html><body><div class="entry-content">
                <a href="/topic-1/">one</a>
                <a href="https://www.sanfoundry.com/topic-2/">two</a>
                <a href="https://elsewhere.example.com/topic-3/">offsite</a>
                <a href="/1000-automata/#chapter">anchored</a>
                <a href="/topic-4/">four</a>
            </div></body></html>
        "#;
        let links = collect_subject_links(html, &base(), 2);
        assert_eq!(
            links.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec![
                "https://www.sanfoundry.com/topic-1/",
                "https://www.sanfoundry.com/topic-2/",
            ]
        );
    }

    #[test]
    fn breadcrumb_last_link_is_subject() {
        let html = r#"
            <html><body>
            <div class="entry-breadcrumbs">
                <a href="/">Home</a> » <a href="/automata/">Automata Theory</a>
            </div>
            <h1>DFA Questions</h1></body></html>
        "#;
        assert_eq!(breadcrumb_subject(html).unwrap(), "Automata Theory");
        assert_eq!(first_heading(html).unwrap(), "DFA Questions");
    }
}
