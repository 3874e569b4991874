use bytes::Bytes;

/// Raw image bytes plus the declared content type, ready for data-URI
/// embedding.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: String,
}
