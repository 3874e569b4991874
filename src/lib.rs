pub mod app_state;
pub mod assembler;
pub mod browser;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod orchestrator;
pub mod routing;
pub mod server;
