use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("script evaluation failed: {0}")]
    Evaluate(String),

    #[error("content retrieval failed: {0}")]
    Content(String),

    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// One live browser page serving a single request: navigation, markup
/// capture, and final PDF rendering all go through the same session.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Evaluate a script for its side effects; the result value is ignored.
    async fn evaluate(&self, script: &str) -> Result<(), BrowserError>;

    /// Serialized markup of the current document.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Replace the document with `html` and print it to PDF bytes.
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, BrowserError>;

    /// Release the underlying browser process. Must be called on every exit
    /// path; a leaked headless browser is an OS-level process leak.
    async fn close(self: Box<Self>);
}

/// Produces one session per request. Behind a trait so tests can inject a
/// scripted session with canned page content.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}
