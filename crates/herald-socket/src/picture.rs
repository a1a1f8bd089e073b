use std::future::Future;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;

use crate::error::Result;

/// Source media for a channel picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaUpload {
    Bytes(Bytes),
    Path(PathBuf),
    Url(String),
}

/// Fetches and crops media into the image the service stores as a channel
/// picture. Supplied by the media layer.
pub trait PictureDeriver: Send + Sync {
    fn derive_picture(&self, media: MediaUpload) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Encode a derived image for the `picture` mutation field.
pub fn encode_picture(image: &[u8]) -> String {
    BASE64.encode(image)
}
