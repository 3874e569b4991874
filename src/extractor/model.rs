use crate::extractor::images::ImageRequest;

/// Output of the synchronous structural pass over one topic page: classified,
/// sanitized block markup with image sources normalized but not yet fetched.
#[derive(Debug, Clone)]
pub struct TopicDraft {
    pub title: String,
    pub html: String,
    pub images: Vec<ImageRequest>,
    pub blocks: usize,
}

/// Per-topic result carried upward through the batch. A topic that scraped
/// cleanly but matched no blocks is distinguishable from one that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    Extracted { blocks: usize },
    Empty,
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct TopicResult {
    pub title: String,
    pub html: String,
    pub outcome: TopicOutcome,
}

impl TopicResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            html: String::new(),
            outcome: TopicOutcome::Failed {
                reason: reason.into(),
            },
        }
    }
}
