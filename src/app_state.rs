use std::sync::Arc;

use crate::browser::{BrowserLauncher, ChromiumLauncher};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub browser: Arc<dyn BrowserLauncher>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let browser = Arc::new(ChromiumLauncher::new(&config));
        Self {
            config: Arc::new(config),
            browser,
        }
    }

    /// Build with an injected launcher; tests use this to script sessions.
    pub fn with_launcher(config: Config, browser: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            config: Arc::new(config),
            browser,
        }
    }
}
