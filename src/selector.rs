use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use spdlog::{debug, info};

use crate::content::{ContentCategory, ContentType};
use crate::knowledge_base::{Concept, KnowledgeBase};
use crate::util::flat_file::{bump_counter, read_lines, write_lines};

/// What the selector decided for the next content item.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub concept: &'a Concept,
    pub category: ContentCategory,
    pub content_type: ContentType,
    pub text: String,
    pub author: Option<String>,
    pub sequence: u64,
}

pub struct ContentSelector {
    used_log: PathBuf,
    counter_file: PathBuf,
}

fn pick_concept<'a, R: Rng>(
    kb: &'a KnowledgeBase,
    used: &[String],
    category: Option<ContentCategory>,
    rng: &mut R,
) -> Result<(&'a Concept, bool)> {
    if kb.is_empty() {
        bail!("Knowledge base is empty");
    }

    let pool: Vec<&Concept> = kb.concepts.iter()
        .filter(|c| category.map_or(true, |cat| c.has_category(cat)))
        .collect();

    if pool.is_empty() {
        bail!("No concept in the knowledge base matches category {}", category.map(|c| c.to_string()).unwrap_or_default());
    }

    let unused: Vec<&Concept> = pool.iter()
        .copied()
        .filter(|c| !used.contains(&c.name))
        .collect();

    let (candidates, reset) = if unused.is_empty() {
        (pool, true)
    } else {
        (unused, false)
    };

    match candidates.choose(rng) {
        Some(concept) => Ok((*concept, reset)),
        None => bail!("No candidate concept available"),
    }
}

/// Content types the concept has material for. `Concept` is always available.
pub fn supported_types(concept: &Concept) -> Vec<ContentType> {
    let mut types = vec![ContentType::Concept];
    if !concept.quotes.is_empty() {
        types.push(ContentType::Quote);
    }
    if !concept.tips.is_empty() {
        types.push(ContentType::Tip);
    }
    if !concept.questions.is_empty() {
        types.push(ContentType::Question);
    }
    types
}

fn pick_type<R: Rng>(concept: &Concept, requested: Option<ContentType>, rng: &mut R) -> ContentType {
    let supported = supported_types(concept);
    match requested {
        Some(t) if supported.contains(&t) => t,
        Some(t) => {
            debug!("Concept {} has no material for type {}, using concept", concept.name, t);
            ContentType::Concept
        }
        None => *supported.choose(rng).unwrap_or(&ContentType::Concept),
    }
}

fn pick_text<R: Rng>(concept: &Concept, content_type: ContentType, rng: &mut R) -> (String, Option<String>) {
    let fallback = || (concept.summary().to_string(), None);
    match content_type {
        ContentType::Quote => concept.quotes.choose(rng)
            .map(|q| (q.text.clone(), q.author.clone()))
            .unwrap_or_else(fallback),
        ContentType::Tip => concept.tips.choose(rng)
            .map(|t| (t.clone(), None))
            .unwrap_or_else(fallback),
        ContentType::Question => concept.questions.choose(rng)
            .map(|q| (q.clone(), None))
            .unwrap_or_else(fallback),
        ContentType::Concept => fallback(),
    }
}

impl ContentSelector {
    pub fn new(used_log: &Path, counter_file: &Path) -> Self {
        ContentSelector {
            used_log: used_log.to_path_buf(),
            counter_file: counter_file.to_path_buf(),
        }
    }

    pub fn used_names(&self) -> Result<Vec<String>> {
        read_lines(&self.used_log)
    }

    /// Picks a concept not used yet, records it in the used log and bumps the counter.
    pub fn select<'a, R: Rng>(
        &self,
        kb: &'a KnowledgeBase,
        category: Option<ContentCategory>,
        content_type: Option<ContentType>,
        rng: &mut R,
    ) -> Result<Selection<'a>> {
        let mut used = self.used_names()?;
        let (concept, reset) = pick_concept(kb, &used, category, rng)?;

        let category = category
            .or_else(|| concept.known_categories().first().copied())
            .unwrap_or(ContentCategory::Reflection);
        let content_type = pick_type(concept, content_type, rng);
        let (text, author) = pick_text(concept, content_type, rng);

        if reset {
            info!("Every concept was already used, resetting {}", self.used_log.display());
            used.clear();
        }
        used.push(concept.name.clone());
        write_lines(&self.used_log, &used)
            .context("Error updating the used content log")?;

        let sequence = bump_counter(&self.counter_file)?;
        info!("Selected concept {} as {} / {} (#{})", concept.name, category, content_type, sequence);

        Ok(Selection {
            concept,
            category,
            content_type,
            text,
            author,
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::test_data::KNOWLEDGE_BASE_DATA;
    use crate::util::flat_file::read_counter;

    fn selector(dir: &Path) -> ContentSelector {
        ContentSelector::new(&dir.join("used.txt"), &dir.join("counter.txt"))
    }

    #[test]
    fn test_same_seed_same_selection() {
        let kb = KnowledgeBase::parse(KNOWLEDGE_BASE_DATA).unwrap();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let a = selector(first.path()).select(&kb, None, None, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = selector(second.path()).select(&kb, None, None, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_repeats_until_exhausted() {
        let kb = KnowledgeBase::parse(KNOWLEDGE_BASE_DATA).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let selector = selector(dir.path());
        let mut rng = StdRng::seed_from_u64(7);

        let mut names: Vec<String> = (0..3)
            .map(|_| selector.select(&kb, None, None, &mut rng).unwrap().concept.name.clone())
            .collect();
        names.sort();
        assert_eq!(names, ["Desejo", "Escuta", "Inconsciente"]);
        assert_eq!(selector.used_names().unwrap().len(), 3);

        let fourth = selector.select(&kb, None, None, &mut rng).unwrap();
        assert_eq!(selector.used_names().unwrap(), [fourth.concept.name.clone()]);
        assert_eq!(fourth.sequence, 4);
        assert_eq!(read_counter(&dir.path().join("counter.txt")).unwrap(), 4);
    }

    #[test]
    fn test_category_filter() {
        let kb = KnowledgeBase::parse(KNOWLEDGE_BASE_DATA).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let selection = selector(dir.path())
            .select(&kb, Some(ContentCategory::PracticalTips), Some(ContentType::Tip), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(selection.concept.name, "Escuta");
        assert_eq!(selection.category, ContentCategory::PracticalTips);
        assert_eq!(selection.content_type, ContentType::Tip);
        assert_eq!(selection.text, "Anote seus sonhos logo ao acordar.");

        let err = selector(dir.path())
            .select(&kb, Some(ContentCategory::JungTheory), None, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(err.to_string().contains("jung_theory"));
    }

    #[test]
    fn test_quote_and_fallbacks() {
        let kb = KnowledgeBase::parse(KNOWLEDGE_BASE_DATA).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let quote = selector(dir.path())
            .select(&kb, Some(ContentCategory::FreudianConcepts), Some(ContentType::Quote), &mut rng)
            .unwrap();
        assert_eq!(quote.text, "Onde estava o isso, o eu deve advir.");
        assert_eq!(quote.author.as_deref(), Some("Sigmund Freud"));

        // Desejo has no quotes and no short description
        let desire = selector(dir.path())
            .select(&kb, Some(ContentCategory::LacanConcepts), Some(ContentType::Quote), &mut rng)
            .unwrap();
        assert_eq!(desire.content_type, ContentType::Concept);
        assert_eq!(desire.text, "O desejo é o desejo do Outro.");
        assert_eq!(desire.author, None);
    }

    #[test]
    fn test_category_derived_from_concept() {
        let kb = KnowledgeBase::parse(r#"{"concepts": [
            {"name": "Sem categoria"},
            {"name": "Pulsão", "categories": ["x", "conceitos_freudianos"]}
        ]}"#).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let selector = selector(dir.path());
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = vec![];
        for _ in 0..2 {
            let s = selector.select(&kb, None, None, &mut rng).unwrap();
            seen.push((s.concept.name.clone(), s.category));
        }
        seen.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(seen, vec![
            ("Pulsão".to_string(), ContentCategory::FreudianConcepts),
            ("Sem categoria".to_string(), ContentCategory::Reflection),
        ]);
    }

    #[test]
    fn test_empty_knowledge_base() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::default();
        let err = selector(dir.path()).select(&kb, None, None, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err.to_string(), "Knowledge base is empty");
        assert!(!dir.path().join("counter.txt").exists());
    }
}
