use crate::fetcher::{errors::FetchError, types::FetchedImage};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::instrument;

const MAX_IMAGE_SIZE: u64 = 2 * 1024 * 1024; // 2MB
const IMAGE_TIMEOUT_SECS: u64 = 15;

/// Browser-like identification: the site serves image assets normally only
/// to requests that look like a real browser with a same-site referer.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(IMAGE_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

pub fn get_client() -> &'static Client {
    &HTTP_CLIENT
}

/// Fetch one image. The URL must already be absolute and query-stripped
/// (see `extractor::images::normalize_image_src`).
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_image(url: &str, referer: &str) -> Result<FetchedImage, FetchError> {
    let parsed_url = url::Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(parsed_url)
        .header(reqwest::header::REFERER, referer)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_IMAGE_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("image/png")
        .to_string();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    if bytes.len() as u64 > MAX_IMAGE_SIZE {
        return Err(FetchError::BodyTooLarge(bytes.len() as u64));
    }

    Ok(FetchedImage {
        bytes,
        content_type,
    })
}
