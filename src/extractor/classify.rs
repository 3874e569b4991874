//! Pure classification heuristics, decoupled from DOM traversal so they can
//! be tested with plain strings and metadata.

use regex::Regex;
use std::sync::LazyLock;

/// Structural marker class carried by expandable answer/explanation regions.
pub const ANSWER_MARKER_CLASS: &str = "collapseomatic_content";

/// Class substring shared by the interactive expand/collapse toggles.
pub const COLLAPSE_TOGGLE_MARKER: &str = "collapseomatic";

/// Promotional text markers; a block containing any of these is noise.
const NOISE_MARKERS: [&str; 3] = ["Enroll", "Certification", "advertisement"];

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());

static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-d]\)\s").unwrap());

static ANSWER_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Answer:\s*([a-d])").unwrap());

/// Shown in the answer label when no "Answer: <letter>" line is present.
pub const UNKNOWN_ANSWER: &str = "?";

/// Loose option fallback only applies to short blocks.
const OPTION_FALLBACK_MAX_LEN: usize = 100;

/// Semantic role of one top-level content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Question,
    Option,
    Answer,
}

/// Classify one block from its trimmed visible text and its class list.
///
/// Rules apply in declaration order; `None` means the block is noise and is
/// dropped from the output.
pub fn classify_block(text: &str, classes: &[&str]) -> Option<BlockTag> {
    let text = text.trim();

    if NOISE_MARKERS.iter().any(|m| text.contains(m)) {
        return None;
    }
    if QUESTION_RE.is_match(text) {
        return Some(BlockTag::Question);
    }
    if classes.iter().any(|c| *c == ANSWER_MARKER_CLASS) {
        return Some(BlockTag::Answer);
    }
    if OPTION_RE.is_match(text)
        || (text.len() < OPTION_FALLBACK_MAX_LEN && text.contains("a)"))
    {
        return Some(BlockTag::Option);
    }
    None
}

/// Extract the selected option letter from an answer block's text, e.g.
/// "Answer: c". Falls back to [`UNKNOWN_ANSWER`] when absent.
pub fn answer_letter(text: &str) -> String {
    ANSWER_LETTER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_ANSWER.to_string())
}

/// Keep only the portion of an answer block after the literal
/// "Explanation:" marker; the whole body when the marker is absent.
pub fn explanation_body(html: &str) -> &str {
    match html.split_once("Explanation:") {
        Some((_, tail)) => tail,
        None => html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_text_is_question() {
        assert_eq!(
            classify_block("1. What is a finite automaton?", &[]),
            Some(BlockTag::Question)
        );
        assert_eq!(
            classify_block("12. Which of the following holds?", &["wp-block"]),
            Some(BlockTag::Question)
        );
    }

    #[test]
    fn question_rule_wins_over_classes() {
        // Numbering dominates regardless of other attributes.
        assert_eq!(
            classify_block("3. Pick one", &["collapseomatic_content"]),
            Some(BlockTag::Question)
        );
    }

    #[test]
    fn marker_class_is_answer() {
        assert_eq!(
            classify_block("Answer: b Explanation: because", &["collapseomatic_content"]),
            Some(BlockTag::Answer)
        );
    }

    #[test]
    fn lettered_text_is_option() {
        assert_eq!(classify_block("a) foo", &[]), Some(BlockTag::Option));
        assert_eq!(classify_block("d) all of the mentioned", &[]), Some(BlockTag::Option));
    }

    #[test]
    fn short_block_containing_option_marker_is_option() {
        // Malformed option markup: marker not at the start, but short.
        assert_eq!(classify_block("view answer a) yes", &[]), Some(BlockTag::Option));
        let long = format!("{} a) buried", "x".repeat(120));
        assert_eq!(classify_block(&long, &[]), None);
    }

    #[test]
    fn promotional_text_is_noise() {
        assert_eq!(classify_block("Enroll now for the course!", &[]), None);
        assert_eq!(classify_block("1. Get your Certification today", &[]), None);
        assert_eq!(classify_block("advertisement", &[]), None);
    }

    #[test]
    fn unmatched_block_is_dropped() {
        assert_eq!(classify_block("Sanfoundry Global Education", &[]), None);
        assert_eq!(classify_block("", &[]), None);
    }

    #[test]
    fn answer_letter_extraction() {
        assert_eq!(answer_letter("Answer: c\nExplanation: trivial"), "c");
        assert_eq!(answer_letter("Answer:b"), "b");
        assert_eq!(answer_letter("no marker here"), UNKNOWN_ANSWER);
        // Only a-d qualify as option letters.
        assert_eq!(answer_letter("Answer: x"), UNKNOWN_ANSWER);
    }

    #[test]
    fn explanation_split_keeps_tail() {
        assert_eq!(
            explanation_body("<b>Answer: a</b> Explanation: the grammar is regular"),
            " the grammar is regular"
        );
        assert_eq!(explanation_body("<p>no marker</p>"), "<p>no marker</p>");
    }
}
