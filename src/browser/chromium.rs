//! Headless Chromium implementation of the browser session.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::browser::session::{BrowserError, BrowserLauncher, BrowserSession};
use crate::config::Config;

pub struct ChromiumLauncher {
    chrome_executable: Option<String>,
}

impl ChromiumLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            chrome_executable: config.chrome_executable().map(str::to_string),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--remote-debugging-port=0",
        ]);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(Path::new(path));
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        debug!("headless browser launched");

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Give CDP state a moment to settle before opening the page.
        sleep(Duration::from_millis(300)).await;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            page,
            handler_task,
        }))
    }
}

pub struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let err = |e: chromiumoxide::error::CdpError| BrowserError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };
        self.page.goto(url).await.map_err(err)?;
        self.page.wait_for_navigation().await.map_err(err)?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<(), BrowserError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Evaluate(e.to_string()))?;
        Ok(())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Content(e.to_string()))
    }

    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, BrowserError> {
        self.page
            .set_content(html)
            .await
            .map_err(|e| BrowserError::Render(e.to_string()))?;
        let params = PrintToPdfParams {
            print_background: Some(true),
            prefer_css_page_size: Some(true),
            ..Default::default()
        };
        self.page
            .pdf(params)
            .await
            .map_err(|e| BrowserError::Render(e.to_string()))
    }

    async fn close(self: Box<Self>) {
        let this = *self;
        let mut browser = this.browser.into_inner();
        if let Err(err) = browser.close().await {
            warn!(error = %err, "browser close failed");
        }
        let _ = browser.wait().await;
        this.handler_task.abort();
    }
}
