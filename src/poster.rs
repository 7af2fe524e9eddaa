use chrono::Utc;
use spdlog::{error, info, warn};

use crate::content::Content;
use crate::instagram::InstagramApi;

/// Publishes content items. Without an API client it hands out simulated ids.
pub struct PosterAgent {
    client: Option<Box<dyn InstagramApi>>,
}

pub fn simulated_post_id() -> String {
    format!("simulated_post_{}", Utc::now().timestamp())
}

impl PosterAgent {
    pub fn new(client: Option<Box<dyn InstagramApi>>) -> Self {
        if client.is_none() {
            warn!("PosterAgent has no Instagram client, posts will be simulated");
        }
        PosterAgent { client }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Returns the post id, or None when the content can't be posted.
    pub fn post_content(&self, content: &Content) -> Option<String> {
        info!("Posting content {} - {}", content.id, content.title);

        let image = match content.image_path {
            Some(ref path) if content.has_image() => path,
            Some(ref path) => {
                error!("Image {} for content {} does not exist", path.display(), content.id);
                return None;
            }
            None => {
                error!("Content {} has no image, it can't be posted", content.id);
                return None;
            }
        };

        let Some(ref client) = self.client else {
            let post_id = simulated_post_id();
            info!("Content {} 'posted' with simulated id {}", content.id, post_id);
            return Some(post_id);
        };

        match client.publish_photo(image, &content.caption) {
            Ok(post_id) => {
                info!("Content {} posted. Post id: {}", content.id, post_id);
                Some(post_id)
            }
            Err(e) => {
                error!("Error posting content {}: {:#}", content.id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::instagram::fake::FakeApi;
    use crate::test_data::sample_content;

    fn content_with_image(dir: &std::path::Path) -> Content {
        let path = dir.join("00007_post.jpg");
        fs::write(&path, b"jpeg").unwrap();
        Content {
            image_path: Some(path),
            ..sample_content()
        }
    }

    #[test]
    fn test_simulated_post() {
        let dir = tempfile::tempdir().unwrap();
        let poster = PosterAgent::new(None);
        let post_id = poster.post_content(&content_with_image(dir.path())).unwrap();
        assert!(post_id.starts_with("simulated_post_"));
        assert!(post_id["simulated_post_".len()..].parse::<i64>().is_ok());
    }

    #[test]
    fn test_no_image() {
        let poster = PosterAgent::new(None);
        assert!(poster.post_content(&sample_content()).is_none());

        let content = Content {
            image_path: Some("/nonexistent/img.jpg".into()),
            ..sample_content()
        };
        assert!(poster.post_content(&content).is_none());
    }

    #[test]
    fn test_post_through_client() {
        let dir = tempfile::tempdir().unwrap();
        let content = content_with_image(dir.path());
        let poster = PosterAgent::new(Some(Box::new(FakeApi::default())));
        assert!(poster.has_client());
        assert_eq!(poster.post_content(&content).as_deref(), Some("17901"));

        let failing = PosterAgent::new(Some(Box::new(FakeApi { fail: true, ..FakeApi::default() })));
        assert!(failing.post_content(&content).is_none());
    }
}
