use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rand::Rng;
use spdlog::{error, info, warn};
use uuid::Uuid;

use crate::caption::{CaptionBuilder, CaptionInput};
use crate::config::Config;
use crate::content::content_store::ContentStore;
use crate::content::{Content, ContentCategory, ContentType};
use crate::knowledge_base::KnowledgeBase;
use crate::render::compositor::{ImageCompositor, RenderJob};
use crate::render::fonts::FontSet;
use crate::selector::ContentSelector;

/// Turns knowledge-base concepts into rendered, captioned content items.
pub struct CreatorAgent {
    knowledge_base: Option<KnowledgeBase>,
    selector: ContentSelector,
    captions: CaptionBuilder,
    compositor: ImageCompositor,
    store: ContentStore,
    output_dir: PathBuf,
}

fn load_caption_builder(config: &Config) -> Result<CaptionBuilder> {
    let settings = config.caption.clone();
    match config.paths.caption_template {
        Some(ref path) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("Error reading caption template {}", path.display()))?;
            Ok(CaptionBuilder::new(src, settings)?)
        }
        None => Ok(CaptionBuilder::with_default_template(settings)?),
    }
}

impl CreatorAgent {
    pub fn new(config: &Config) -> Result<CreatorAgent> {
        let fonts = FontSet::load(&config.image);
        Self::with_fonts(config, fonts)
    }

    pub fn with_fonts(config: &Config, fonts: FontSet) -> Result<CreatorAgent> {
        let paths = &config.paths;
        fs::create_dir_all(&paths.output_dir)
            .with_context(|| format!("Error creating output dir {}", paths.output_dir.display()))?;

        // A broken knowledge base is reported when content is requested
        let knowledge_base = match KnowledgeBase::from_file(&paths.knowledge_base) {
            Ok(kb) => Some(kb),
            Err(e) => {
                error!("{:#}", e);
                None
            }
        };

        info!("CreatorAgent ready. Templates: {}, Output: {}", paths.templates_dir.display(), paths.output_dir.display());

        Ok(CreatorAgent {
            knowledge_base,
            selector: ContentSelector::new(&paths.used_log, &paths.counter_file),
            captions: load_caption_builder(config)?,
            compositor: ImageCompositor::new(config.image.clone(), &paths.templates_dir, fonts),
            store: ContentStore::new(&paths.output_dir),
            output_dir: paths.output_dir.clone(),
        })
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    fn image_path(&self, content: &Content) -> PathBuf {
        self.output_dir.join(format!("{}.jpg", content.file_stem()))
    }

    /// Selects a concept, renders the image and writes the content record.
    pub fn try_create<R: Rng>(
        &self,
        category: Option<ContentCategory>,
        content_type: Option<ContentType>,
        rng: &mut R,
    ) -> Result<Content> {
        let kb = match self.knowledge_base {
            Some(ref kb) if !kb.is_empty() => kb,
            _ => anyhow::bail!("Knowledge base not loaded or empty, no content can be created"),
        };

        let selection = self.selector.select(kb, category, content_type, rng)?;
        let concept = selection.concept;

        let (caption, hashtags) = self.captions.build(&CaptionInput {
            title: &concept.name,
            text: &selection.text,
            author: selection.author.as_deref(),
            description: &concept.description,
            category: selection.category,
            content_type: selection.content_type,
            keywords: &concept.keywords,
        });

        let mut content = Content {
            id: Uuid::new_v4().to_string(),
            sequence: selection.sequence,
            title: concept.name.clone(),
            text: selection.text.clone(),
            author: selection.author.clone(),
            caption,
            category: selection.category,
            content_type: selection.content_type,
            hashtags,
            image_path: None,
            created_at: Local::now(),
            posted: false,
            post_id: None,
        };

        let job = RenderJob {
            title: &content.title,
            text: &content.text,
            author: content.author.as_deref(),
            category: content.category,
        };
        let image_path = self.image_path(&content);
        match self.compositor.render_to_file(&job, &image_path) {
            Ok(path) if path.is_file() => content.image_path = Some(path),
            Ok(path) => warn!("Image {} was not found after rendering", path.display()),
            Err(e) => error!("Error rendering image for {}: {:#}", content.id, e),
        }

        self.store.save(&content)?;
        Ok(content)
    }

    /// Same as [`CreatorAgent::try_create`], logging failures instead of returning them.
    pub fn create_content<R: Rng>(
        &self,
        category: Option<ContentCategory>,
        content_type: Option<ContentType>,
        rng: &mut R,
    ) -> Option<Content> {
        info!("Content requested. Category: {:?}, Type: {:?}", category, content_type);
        match self.try_create(category, content_type, rng) {
            Ok(content) => {
                info!("Content created: {}", content);
                Some(content)
            }
            Err(e) => {
                error!("Error creating content: {:#}", e);
                None
            }
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::test_data::{test_config, test_fonts, KNOWLEDGE_BASE_DATA};

    #[test]
    fn test_create_content() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::write(&config.paths.knowledge_base, KNOWLEDGE_BASE_DATA).unwrap();

        let creator = CreatorAgent::with_fonts(&config, FontSet::empty(0.5)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let content = creator
            .create_content(Some(ContentCategory::FreudianConcepts), Some(ContentType::Quote), &mut rng)
            .unwrap();

        assert_eq!(content.title, "Inconsciente");
        assert_eq!(content.text, "Onde estava o isso, o eu deve advir.");
        assert_eq!(content.author.as_deref(), Some("Sigmund Freud"));
        assert_eq!(content.sequence, 1);
        assert!(content.has_image());
        assert_eq!(content.image_path, Some(dir.path().join("output").join(format!("00001_{}.jpg", content.id))));
        assert!(content.hashtags.contains(&"#freud".to_string()));
        assert!(content.caption.contains("- Sigmund Freud"));
        assert!(!content.posted);

        let saved = creator.store().latest_unposted().unwrap().unwrap();
        assert_eq!(saved, content);
    }

    #[test]
    fn test_missing_knowledge_base() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let creator = CreatorAgent::with_fonts(&config, FontSet::empty(0.5)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(creator.create_content(None, None, &mut rng).is_none());
        assert!(creator.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_custom_caption_template() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        fs::write(&config.paths.knowledge_base, KNOWLEDGE_BASE_DATA).unwrap();
        let template = dir.path().join("caption.mustache");
        fs::write(&template, "{{{title}}}|{{{hashtags}}}").unwrap();
        config.paths.caption_template = Some(template);

        let creator = CreatorAgent::with_fonts(&config, FontSet::empty(0.5)).unwrap();
        let content = creator
            .try_create(Some(ContentCategory::PracticalTips), None, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(content.caption, format!("Escuta|{}", content.hashtags.join(" ")));

        config.paths.caption_template = Some(dir.path().join("missing.mustache"));
        assert!(CreatorAgent::with_fonts(&config, FontSet::empty(0.5)).is_err());
    }

    #[test]
    fn test_same_seed_same_image_bytes() {
        let render = |seed: u64| {
            let dir = tempfile::tempdir().unwrap();
            let config = test_config(dir.path());
            fs::write(&config.paths.knowledge_base, KNOWLEDGE_BASE_DATA).unwrap();
            let creator = CreatorAgent::with_fonts(&config, test_fonts()).unwrap();
            let content = creator.try_create(None, None, &mut StdRng::seed_from_u64(seed)).unwrap();
            let bytes = fs::read(content.image_path.as_ref().unwrap()).unwrap();
            (content.title, content.text, bytes)
        };

        let (title, text, first) = render(3);
        let (same_title, same_text, second) = render(3);
        assert_eq!((&title, &text), (&same_title, &same_text));
        assert!(!first.is_empty());
        assert!(first == second, "same seed rendered different image bytes");
    }
}
