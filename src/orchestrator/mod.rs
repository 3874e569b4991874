//! Per-request orchestration: route the URL, drive one browser session
//! across every topic page it implies, and hand the assembled document to
//! the PDF renderer.

pub mod resolve;

use thiserror::Error;
use tokio::time::{Duration, sleep};
use tracing::{info, instrument, warn};
use url::Url;

use crate::assembler;
use crate::browser::{BrowserError, BrowserLauncher, BrowserSession};
use crate::config::Config;
use crate::extractor::{self, TopicOutcome, TopicResult};
use crate::routing::{self, Route, RouteError};

/// Fallback subject title when no breadcrumb or heading is available.
const SITE_NAME: &str = "Sanfoundry";

/// Click-all for the site's collapsible answer sections; extraction must see
/// every section expanded.
const EXPAND_SCRIPT: &str =
    r#"document.querySelectorAll(".collapseomatic").forEach(el => el.click())"#;

#[derive(Error, Debug)]
pub enum OrchestrateError {
    #[error("chapter header not found: {0}")]
    ChapterNotFound(String),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// A rendered document plus its attachment filename.
#[derive(Debug, Clone)]
pub struct ConvertOutput {
    pub pdf: Vec<u8>,
    pub filename: String,
}

/// Full request lifecycle. The session is released on every exit path.
#[instrument(skip(launcher, config))]
pub async fn convert(
    launcher: &dyn BrowserLauncher,
    config: &Config,
    raw_url: &str,
) -> Result<ConvertOutput, OrchestrateError> {
    let route = routing::classify_url(raw_url)?;
    let session = launcher.launch().await?;

    let outcome = run_route(session.as_ref(), config, route).await;
    let rendered = match outcome {
        Ok((body, stem)) => {
            let document = assembler::wrap_document(&body);
            let pdf = session.render_pdf(&document).await;
            pdf.map(|pdf| ConvertOutput {
                pdf,
                filename: format!("{}.pdf", assembler::sanitize_filename(&stem)),
            })
            .map_err(OrchestrateError::from)
        }
        Err(err) => Err(err),
    };

    session.close().await;
    rendered
}

/// Returns the assembled body HTML and the unsanitized filename stem.
async fn run_route(
    session: &dyn BrowserSession,
    config: &Config,
    route: Route,
) -> Result<(String, String), OrchestrateError> {
    match route {
        Route::Topic(url) => {
            let raw = load_page(session, config, url.as_str()).await?;
            let subject = resolve::breadcrumb_subject(&raw)
                .unwrap_or_else(|| SITE_NAME.to_string());
            let topic = extractor::extract(&raw, config.site_origin()).await;
            log_topic(url.as_str(), &topic);
            let stem = format!("{subject}_{}", topic.title);
            Ok((topic.html, stem))
        }
        Route::Chapter { base, fragment } => {
            let raw = load_page(session, config, base.as_str()).await?;
            let section = resolve::resolve_chapter(&raw, &fragment, &base)
                .ok_or_else(|| OrchestrateError::ChapterNotFound(fragment.clone()))?;
            let subject =
                resolve::first_heading(&raw).unwrap_or_else(|| SITE_NAME.to_string());
            let body = scrape_all(session, config, &section.links).await;
            let stem = format!("{subject}_{}", section.title);
            Ok((body, stem))
        }
        Route::SubjectIndex(url) => {
            let raw = load_page(session, config, url.as_str()).await?;
            let links =
                resolve::collect_subject_links(&raw, &url, config.subject_topic_cap());
            let subject =
                resolve::first_heading(&raw).unwrap_or_else(|| SITE_NAME.to_string());
            let body = scrape_all(session, config, &links).await;
            let stem = format!("{subject}_Manual");
            Ok((body, stem))
        }
    }
}

/// Navigate, force-expand collapsible sections, and capture the stabilized
/// markup.
async fn load_page(
    session: &dyn BrowserSession,
    config: &Config,
    url: &str,
) -> Result<String, BrowserError> {
    session.navigate(url).await?;
    if let Err(err) = session.evaluate(EXPAND_SCRIPT).await {
        // Pages without collapsible sections still extract fine.
        warn!(url, error = %err, "expand script failed");
    }
    sleep(Duration::from_millis(config.expand_settle_ms())).await;
    session.content().await
}

/// Scrape every topic sequentially, in document order. A failing topic
/// contributes nothing but never aborts the batch.
async fn scrape_all(session: &dyn BrowserSession, config: &Config, links: &[Url]) -> String {
    let mut body = String::new();
    for link in links {
        let topic = match load_page(session, config, link.as_str()).await {
            Ok(raw) => extractor::extract(&raw, config.site_origin()).await,
            Err(err) => TopicResult::failed(err.to_string()),
        };
        log_topic(link.as_str(), &topic);
        body.push_str(&topic.html);
    }
    body
}

fn log_topic(url: &str, topic: &TopicResult) {
    match &topic.outcome {
        TopicOutcome::Extracted { blocks } => {
            info!(url, blocks, title = %topic.title, "topic extracted");
        }
        TopicOutcome::Empty => {
            warn!(url, title = %topic.title, "topic contributed no blocks");
        }
        TopicOutcome::Failed { reason } => {
            warn!(url, reason = %reason, "topic scrape failed");
        }
    }
}
