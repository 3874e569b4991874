pub mod client;
pub mod errors;
pub mod types;

pub use client::{fetch_image, get_client};
pub use errors::FetchError;
pub use types::FetchedImage;
