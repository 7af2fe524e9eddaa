use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod credentials;
pub mod graph_client;

/// What the API reports about a published media item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comments_count: Option<u64>,
}

/// Operations the poster and the supervisor need from the social-media API.
pub trait InstagramApi {
    /// Uploads the image with its caption and returns the published post id.
    fn publish_photo(&self, image: &Path, caption: &str) -> Result<String>;

    /// None when the media does not exist.
    fn media_info(&self, media_id: &str) -> Result<Option<MediaInfo>>;

    fn health(&self) -> Result<()>;
}
