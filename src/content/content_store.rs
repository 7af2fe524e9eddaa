use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spdlog::warn;

use crate::content::Content;

/// JSON records of created content, kept next to the rendered images.
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: &Path) -> Self {
        ContentStore {
            dir: dir.to_path_buf(),
        }
    }

    pub fn record_path(&self, content: &Content) -> PathBuf {
        self.dir.join(format!("{}.json", content.file_stem()))
    }

    pub fn save(&self, content: &Content) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Error creating output dir {}", self.dir.display()))?;
        let path = self.record_path(content);
        let json = serde_json::to_string_pretty(content)?;
        fs::write(&path, json)
            .with_context(|| format!("Error writing content record {}", path.display()))?;
        Ok(path)
    }

    /// All readable records ordered by sequence. Unreadable files are skipped.
    pub fn load_all(&self) -> Result<Vec<Content>> {
        if !self.dir.is_dir() {
            return Ok(vec![]);
        }

        let mut items = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<Content>(&s).map_err(anyhow::Error::from));
            match parsed {
                Ok(content) => items.push(content),
                Err(e) => warn!("Skipping content record {}: {}", path.display(), e),
            }
        }

        items.sort_by(|a, b| a.sequence.cmp(&b.sequence).then(a.created_at.cmp(&b.created_at)));
        Ok(items)
    }

    /// Newest item that still has to be posted.
    pub fn latest_unposted(&self) -> Result<Option<Content>> {
        let items = self.load_all()?;
        Ok(items.into_iter().rev().find(|c| !c.posted && c.has_image()))
    }

    pub fn latest_posted(&self) -> Result<Option<Content>> {
        let items = self.load_all()?;
        Ok(items.into_iter().rev().find(|c| c.posted && c.post_id.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::sample_content;

    #[test]
    fn test_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        assert!(store.latest_unposted().unwrap().is_none());

        let image = dir.path().join("img.png");
        fs::write(&image, b"png").unwrap();

        let mut first = sample_content();
        first.sequence = 1;
        first.image_path = Some(image.clone());
        store.save(&first).unwrap();

        let mut second = sample_content();
        second.id = "second".to_string();
        second.sequence = 2;
        second.image_path = Some(image.clone());
        store.save(&second).unwrap();

        // Without an image it can't be posted
        let mut third = sample_content();
        third.id = "third".to_string();
        third.sequence = 3;
        store.save(&third).unwrap();

        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(store.latest_unposted().unwrap().unwrap().id, "second");
        assert!(store.latest_posted().unwrap().is_none());

        second.mark_posted("999".to_string());
        store.save(&second).unwrap();
        assert_eq!(store.latest_unposted().unwrap().unwrap().sequence, 1);
        assert_eq!(store.latest_posted().unwrap().unwrap().post_id.as_deref(), Some("999"));
    }
}
