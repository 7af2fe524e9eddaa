use std::io;
use std::io::ErrorKind;

use lazy_static::lazy_static;
use ramhorns::Template;
use regex::Regex;

use crate::config::CaptionSettings;
use crate::content::{ContentCategory, ContentType};

pub const DEFAULT_CAPTION_TEMPLATE: &str = r##"{{{title}}}

{{{text}}}{{#has_author}}
- {{{author}}}{{/has_author}}

{{{description}}}

{{{call_to_action}}}
{{{handle}}}

{{{hashtags}}}"##;

#[derive(ramhorns::Content)]
struct CaptionView<'a> {
    title: &'a str,
    text: &'a str,
    has_author: bool,
    author: &'a str,
    description: &'a str,
    call_to_action: &'a str,
    handle: &'a str,
    hashtags: &'a str,
}

/// Fields a caption is made of.
pub struct CaptionInput<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub author: Option<&'a str>,
    pub description: &'a str,
    pub category: ContentCategory,
    pub content_type: ContentType,
    pub keywords: &'a [String],
}

pub fn category_hashtags(category: ContentCategory) -> &'static [&'static str] {
    match category {
        ContentCategory::FreudianConcepts => &["#freud", "#psicanalisefreudiana", "#teoriafreudiana"],
        ContentCategory::JungTheory => &["#jung", "#psicologiaanalitica", "#arquetipos"],
        ContentCategory::LacanConcepts => &["#lacan", "#psicanaliselacaniana", "#lacanianos"],
        ContentCategory::PracticalTips => &["#autoconhecimento", "#bemestar", "#dicasdepsicologia"],
        ContentCategory::Reflection => &["#reflexao", "#pensamentos", "#reflexaododia"],
    }
}

pub fn type_hashtags(content_type: ContentType) -> &'static [&'static str] {
    match content_type {
        ContentType::Quote => &["#citacoes", "#frases"],
        ContentType::Concept => &["#conceitos"],
        ContentType::Question => &["#perguntas", "#reflita"],
        ContentType::Tip => &["#dicas"],
    }
}

/// `Desejo do Outro` -> `#desejodooutro`. None when nothing usable is left.
pub fn keyword_hashtag(keyword: &str) -> Option<String> {
    lazy_static! {
        static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]").unwrap();
    }

    let ascii = unidecode::unidecode(keyword).to_lowercase();
    let tag = NON_ALNUM.replace_all(&ascii, "");
    if tag.is_empty() {
        None
    } else {
        Some(format!("#{}", tag))
    }
}

fn normalize_tag(tag: &str) -> Option<String> {
    keyword_hashtag(tag.trim_start_matches('#'))
}

pub struct CaptionBuilder {
    template: Template<'static>,
    settings: CaptionSettings,
}

impl CaptionBuilder {
    pub fn new(template_src: String, settings: CaptionSettings) -> io::Result<CaptionBuilder> {
        let template = match Template::new(template_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing caption template: {}", e)));
            }
        };

        Ok(CaptionBuilder {
            template,
            settings,
        })
    }

    pub fn with_default_template(settings: CaptionSettings) -> io::Result<CaptionBuilder> {
        Self::new(DEFAULT_CAPTION_TEMPLATE.to_string(), settings)
    }

    /// Base tags, then category, type and keyword tags. Deduplicated, capped at `max_hashtags`.
    pub fn hashtags(&self, category: ContentCategory, content_type: ContentType, keywords: &[String]) -> Vec<String> {
        let static_tags = category_hashtags(category).iter()
            .chain(type_hashtags(content_type).iter())
            .map(|t| t.to_string());

        let mut tags: Vec<String> = vec![];
        let candidates = self.settings.base_hashtags.iter().cloned()
            .chain(static_tags)
            .chain(keywords.iter().cloned());

        for candidate in candidates {
            if tags.len() >= self.settings.max_hashtags {
                break;
            }
            let Some(tag) = normalize_tag(&candidate) else {
                continue;
            };
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        tags
    }

    /// Renders the caption; returns it together with the hashtags it carries.
    pub fn build(&self, input: &CaptionInput) -> (String, Vec<String>) {
        lazy_static! {
            static ref EXTRA_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
        }

        let hashtags = self.hashtags(input.category, input.content_type, input.keywords);
        let joined = hashtags.join(" ");
        // Long description is dropped when it would just repeat the image text
        let description = if input.description.trim() == input.text.trim() {
            ""
        } else {
            input.description
        };

        let rendered = self.template.render(&CaptionView {
            title: input.title,
            text: input.text,
            has_author: input.author.is_some(),
            author: input.author.unwrap_or_default(),
            description,
            call_to_action: self.settings.call_to_action.as_str(),
            handle: self.settings.handle.as_str(),
            hashtags: joined.as_str(),
        });

        let caption = EXTRA_BLANK_LINES.replace_all(rendered.trim(), "\n\n").to_string();
        (caption, hashtags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CaptionBuilder {
        CaptionBuilder::with_default_template(CaptionSettings::default()).unwrap()
    }

    #[test]
    fn test_keyword_hashtag() {
        assert_eq!(keyword_hashtag("Desejo do Outro"), Some("#desejodooutro".to_string()));
        assert_eq!(keyword_hashtag("análise"), Some("#analise".to_string()));
        assert_eq!(keyword_hashtag("Complexo de Édipo"), Some("#complexodeedipo".to_string()));
        assert_eq!(keyword_hashtag("!!"), None);
    }

    #[test]
    fn test_hashtags_are_deduplicated() {
        let keywords = vec!["Freud".to_string(), "psicanálise".to_string(), "#Inconsciente".to_string()];
        let tags = builder().hashtags(ContentCategory::FreudianConcepts, ContentType::Quote, &keywords);
        assert_eq!(tags, [
            "#psicanalise", "#psicologia", "#saudemental",
            "#freud", "#psicanalisefreudiana", "#teoriafreudiana",
            "#citacoes", "#frases",
            "#inconsciente",
        ]);
    }

    #[test]
    fn test_hashtag_limit() {
        let settings = CaptionSettings {
            max_hashtags: 4,
            ..CaptionSettings::default()
        };
        let builder = CaptionBuilder::with_default_template(settings).unwrap();
        let keywords: Vec<String> = (0..50).map(|i| format!("tag{}", i)).collect();
        let tags = builder.hashtags(ContentCategory::Reflection, ContentType::Concept, &keywords);
        assert_eq!(tags, ["#psicanalise", "#psicologia", "#saudemental", "#reflexao"]);

        let tags = CaptionBuilder::with_default_template(CaptionSettings::default()).unwrap()
            .hashtags(ContentCategory::Reflection, ContentType::Concept, &keywords);
        assert_eq!(tags.len(), 30);
    }

    #[test]
    fn test_no_hashtags_allowed() {
        let settings = CaptionSettings {
            max_hashtags: 0,
            ..CaptionSettings::default()
        };
        let builder = CaptionBuilder::with_default_template(settings).unwrap();
        let keywords = vec!["Freud".to_string()];
        assert!(builder.hashtags(ContentCategory::FreudianConcepts, ContentType::Quote, &keywords).is_empty());

        let (caption, tags) = builder.build(&CaptionInput {
            title: "Inconsciente",
            text: "Onde estava o isso, o eu deve advir.",
            author: None,
            description: "",
            category: ContentCategory::FreudianConcepts,
            content_type: ContentType::Quote,
            keywords: &keywords,
        });
        assert!(tags.is_empty());
        assert!(!caption.contains('#'));
    }

    #[test]
    fn test_build_caption() {
        let keywords = vec!["Freud".to_string()];
        let (caption, tags) = builder().build(&CaptionInput {
            title: "Inconsciente",
            text: "Onde estava o isso, o eu deve advir.",
            author: Some("Sigmund Freud"),
            description: "O inconsciente opera fora da consciência.",
            category: ContentCategory::FreudianConcepts,
            content_type: ContentType::Quote,
            keywords: &keywords,
        });

        assert_eq!(caption, format!(r##"Inconsciente

Onde estava o isso, o eu deve advir.
- Sigmund Freud

O inconsciente opera fora da consciência.

Salve este post e compartilhe com quem precisa ler isso hoje.
@portopsicanalise

{}"##, tags.join(" ")));
    }

    #[test]
    fn test_build_caption_without_author_or_repeated_description() {
        let (caption, _) = builder().build(&CaptionInput {
            title: "Desejo",
            text: "O desejo é o desejo do Outro.",
            author: None,
            description: "O desejo é o desejo do Outro.",
            category: ContentCategory::LacanConcepts,
            content_type: ContentType::Concept,
            keywords: &[],
        });

        assert!(caption.starts_with("Desejo\n\nO desejo é o desejo do Outro.\n\nSalve este post"));
        assert!(!caption.contains("\n\n\n"));
        assert!(caption.ends_with("#lacan #psicanaliselacaniana #lacanianos #conceitos"));
    }

    #[test]
    fn test_custom_template() {
        let builder = CaptionBuilder::new("{{{title}}} <{{{handle}}}>".to_string(), CaptionSettings::default()).unwrap();
        let (caption, _) = builder.build(&CaptionInput {
            title: "Sombra & Luz",
            text: "",
            author: None,
            description: "",
            category: ContentCategory::JungTheory,
            content_type: ContentType::Concept,
            keywords: &[],
        });
        assert_eq!(caption, "Sombra & Luz <@portopsicanalise>");
    }
}
