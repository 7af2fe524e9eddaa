use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod content_store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    #[serde(alias = "conceitos_freudianos")]
    #[value(name = "freudian_concepts", alias = "conceitos_freudianos")]
    FreudianConcepts,
    #[serde(alias = "teoria_junguiana")]
    #[value(name = "jung_theory", alias = "teoria_junguiana")]
    JungTheory,
    #[serde(alias = "conceitos_lacanianos")]
    #[value(name = "lacan_concepts", alias = "conceitos_lacanianos")]
    LacanConcepts,
    #[serde(alias = "dicas_praticas")]
    #[value(name = "practical_tips", alias = "dicas_praticas")]
    PracticalTips,
    #[serde(alias = "reflexoes")]
    #[value(name = "reflection", alias = "reflexoes")]
    Reflection,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 5] = [
        ContentCategory::FreudianConcepts,
        ContentCategory::JungTheory,
        ContentCategory::LacanConcepts,
        ContentCategory::PracticalTips,
        ContentCategory::Reflection,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ContentCategory::FreudianConcepts => "freudian_concepts",
            ContentCategory::JungTheory => "jung_theory",
            ContentCategory::LacanConcepts => "lacan_concepts",
            ContentCategory::PracticalTips => "practical_tips",
            ContentCategory::Reflection => "reflection",
        }
    }

    fn legacy_slug(&self) -> &'static str {
        match self {
            ContentCategory::FreudianConcepts => "conceitos_freudianos",
            ContentCategory::JungTheory => "teoria_junguiana",
            ContentCategory::LacanConcepts => "conceitos_lacanianos",
            ContentCategory::PracticalTips => "dicas_praticas",
            ContentCategory::Reflection => "reflexoes",
        }
    }
}

impl FromStr for ContentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ContentCategory::ALL.into_iter()
            .find(|c| c.slug() == s || c.legacy_slug() == s)
            .ok_or_else(|| format!("Unknown content category {}", s))
    }
}

impl Display for ContentCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[serde(alias = "citacao")]
    #[value(name = "quote", alias = "citacao")]
    Quote,
    #[serde(alias = "conceito")]
    #[value(name = "concept", alias = "conceito")]
    Concept,
    #[serde(alias = "pergunta")]
    #[value(name = "question", alias = "pergunta")]
    Question,
    #[serde(alias = "dica")]
    #[value(name = "tip", alias = "dica")]
    Tip,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Quote,
        ContentType::Concept,
        ContentType::Question,
        ContentType::Tip,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ContentType::Quote => "quote",
            ContentType::Concept => "concept",
            ContentType::Question => "question",
            ContentType::Tip => "tip",
        }
    }

    fn legacy_slug(&self) -> &'static str {
        match self {
            ContentType::Quote => "citacao",
            ContentType::Concept => "conceito",
            ContentType::Question => "pergunta",
            ContentType::Tip => "dica",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ContentType::ALL.into_iter()
            .find(|t| t.slug() == s || t.legacy_slug() == s)
            .ok_or_else(|| format!("Unknown content type {}", s))
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// One generated image + caption pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub sequence: u64,
    pub title: String,
    pub text: String,
    pub author: Option<String>,
    pub caption: String,
    pub category: ContentCategory,
    pub content_type: ContentType,
    pub hashtags: Vec<String>,
    pub image_path: Option<PathBuf>,
    pub created_at: DateTime<Local>,
    pub posted: bool,
    pub post_id: Option<String>,
}

impl Content {
    /// True only when the image path is set and the file is on disk.
    pub fn has_image(&self) -> bool {
        self.image_path.as_ref().is_some_and(|p| p.is_file())
    }

    pub fn mark_posted(&mut self, post_id: String) {
        self.posted = true;
        self.post_id = Some(post_id);
    }

    /// Base name shared by the image and the JSON record.
    pub fn file_stem(&self) -> String {
        format!("{:05}_{}", self.sequence, self.id)
    }
}

impl Display for Content {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "id={}, seq={}, category={}, type={}, title={}",
               self.id,
               self.sequence,
               self.category,
               self.content_type,
               self.title,
        )
    }
}
