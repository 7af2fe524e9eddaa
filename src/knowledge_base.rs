use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::content::ContentCategory;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawQuote")]
pub struct Quote {
    pub text: String,
    pub author: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuote {
    Text(String),
    Full {
        #[serde(alias = "texto")]
        text: String,
        #[serde(default, alias = "autor")]
        author: Option<String>,
    },
}

impl From<RawQuote> for Quote {
    fn from(value: RawQuote) -> Self {
        match value {
            RawQuote::Text(text) => Quote { text, author: None },
            RawQuote::Full { text, author } => Quote { text, author },
        }
    }
}

/// One knowledge-base entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Concept {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "descricao_curta")]
    pub short_description: String,
    #[serde(default, alias = "descricao")]
    pub description: String,
    #[serde(default, alias = "citacoes")]
    pub quotes: Vec<Quote>,
    #[serde(default, alias = "dicas")]
    pub tips: Vec<String>,
    #[serde(default, alias = "perguntas")]
    pub questions: Vec<String>,
    #[serde(default, alias = "categorias")]
    pub categories: Vec<String>,
    #[serde(default, alias = "palavras_chave")]
    pub keywords: Vec<String>,
}

impl Concept {
    /// Categories that map to a known [`ContentCategory`], in declaration order.
    pub fn known_categories(&self) -> Vec<ContentCategory> {
        self.categories.iter()
            .filter_map(|c| c.parse::<ContentCategory>().ok())
            .collect()
    }

    pub fn has_category(&self, category: ContentCategory) -> bool {
        self.known_categories().contains(&category)
    }

    /// Short description, or the long one when the short is missing.
    pub fn summary(&self) -> &str {
        if self.short_description.trim().is_empty() {
            self.description.as_str()
        } else {
            self.short_description.as_str()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default, alias = "conceitos")]
    pub concepts: Vec<Concept>,
}

/// Document formats a knowledge base can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml` / `.yml` files are YAML, anything else is read as JSON.
    pub fn from_path(path: &Path) -> DocumentFormat {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "yaml" || ext == "yml" => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

impl KnowledgeBase {
    pub fn parse(content: &str) -> Result<KnowledgeBase> {
        let kb = serde_json::from_str::<KnowledgeBase>(content)
            .context("Error parsing knowledge base")?;
        Ok(kb)
    }

    pub fn parse_yaml(content: &str) -> Result<KnowledgeBase> {
        if content.trim().is_empty() {
            return Ok(KnowledgeBase::default());
        }
        let kb = ::config::Config::builder()
            .add_source(::config::File::from_str(content, ::config::FileFormat::Yaml))
            .build()
            .and_then(|doc| doc.try_deserialize::<KnowledgeBase>())
            .context("Error parsing knowledge base")?;
        Ok(kb)
    }

    pub fn parse_as(content: &str, format: DocumentFormat) -> Result<KnowledgeBase> {
        match format {
            DocumentFormat::Json => Self::parse(content),
            DocumentFormat::Yaml => Self::parse_yaml(content),
        }
    }

    /// Reads a JSON or YAML knowledge base, picked by the file extension.
    pub fn from_file(path: &Path) -> Result<KnowledgeBase> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Knowledge base file not found: {}", path.display()))?;
        Self::parse_as(&content, DocumentFormat::from_path(path))
            .with_context(|| format!("Invalid knowledge base {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.name == name)
    }
}
