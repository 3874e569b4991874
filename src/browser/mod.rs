pub mod chromium;
pub mod session;

pub use chromium::ChromiumLauncher;
pub use session::{BrowserError, BrowserLauncher, BrowserSession};
