#[cfg(test)]
pub const KNOWLEDGE_BASE_DATA: &str = r#"{
  "conceitos": [
    {
      "nome": "Inconsciente",
      "descricao_curta": "O psíquico verdadeiramente real",
      "descricao": "O inconsciente é a parte da vida psíquica que opera fora da consciência e se revela nos sonhos, atos falhos e sintomas.",
      "citacoes": [
        {"texto": "Onde estava o isso, o eu deve advir.", "autor": "Sigmund Freud"}
      ],
      "categorias": ["conceitos_freudianos"],
      "palavras_chave": ["inconsciente", "Freud"]
    },
    {
      "nome": "Desejo",
      "descricao": "O desejo é o desejo do Outro.",
      "categorias": ["conceitos_lacanianos", "reflexoes"],
      "palavras_chave": ["Lacan", "desejo do Outro"]
    },
    {
      "nome": "Escuta",
      "descricao_curta": "Ouvir além das palavras",
      "descricao": "A escuta analítica acolhe o que se diz e o que escapa ao dizer.",
      "dicas": ["Anote seus sonhos logo ao acordar."],
      "perguntas": ["O que você repete sem perceber?"],
      "categorias": ["dicas_praticas"],
      "palavras_chave": ["escuta", "análise"]
    }
  ]
}"#;

#[cfg(test)]
pub const KNOWLEDGE_BASE_YAML: &str = r#"
conceitos:
  - nome: Inconsciente
    descricao_curta: O psíquico verdadeiramente real
    descricao: >-
      O inconsciente é a parte da vida psíquica que opera fora da consciência
      e se revela nos sonhos, atos falhos e sintomas.
    citacoes:
      - texto: Onde estava o isso, o eu deve advir.
        autor: Sigmund Freud
    categorias: ["conceitos_freudianos"]
    palavras_chave: ["inconsciente", "Freud"]
  - nome: Desejo
    descricao: O desejo é o desejo do Outro.
    categorias:
      - conceitos_lacanianos
      - reflexoes
    palavras_chave: ["Lacan", "desejo do Outro"]
  - nome: Escuta
    descricao_curta: Ouvir além das palavras
    descricao: A escuta analítica acolhe o que se diz e o que escapa ao dizer.
    dicas:
      - Anote seus sonhos logo ao acordar.
    perguntas:
      - O que você repete sem perceber?
    categorias: [dicas_praticas]
    palavras_chave: [escuta, análise]
"#;

#[cfg(test)]
pub const CONFIG_DATA: &str = r##"
[paths]
templates_dir = "assets/templates"
output_dir = "output/images"
knowledge_base = "config/knowledge_base.json"

[image]
size = 720
title_font = "/opt/fonts/Title.ttf"
background_color = "#1E1E2E"
"##;

#[cfg(test)]
pub fn sample_content() -> crate::content::Content {
    use chrono::{Local, TimeZone};

    use crate::content::{Content, ContentCategory, ContentType};

    Content {
        id: "0b6c9c7e-2d35-4f4e-a1ad-0d7c1c3f4a11".to_string(),
        sequence: 7,
        title: "Inconsciente".to_string(),
        text: "O psíquico verdadeiramente real".to_string(),
        author: None,
        caption: "Inconsciente\n\n#psicanalise".to_string(),
        category: ContentCategory::FreudianConcepts,
        content_type: ContentType::Concept,
        hashtags: vec!["#psicanalise".to_string()],
        image_path: None,
        created_at: Local.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap(),
        posted: false,
        post_id: None,
    }
}

#[cfg(test)]
pub fn test_config(dir: &std::path::Path) -> crate::config::Config {
    use crate::config::{CaptionSettings, Config, ImageSettings, Instagram, Paths};

    Config {
        paths: Paths {
            templates_dir: dir.join("templates"),
            output_dir: dir.join("output"),
            knowledge_base: dir.join("knowledge_base.json"),
            counter_file: dir.join("data").join("counter.txt"),
            used_log: dir.join("data").join("used_content.txt"),
            caption_template: None,
        },
        image: ImageSettings {
            size: 200,
            margin: 10,
            ..ImageSettings::default()
        },
        caption: CaptionSettings::default(),
        instagram: Instagram::default(),
        log: None,
    }
}

/// Font shipped with the crate, used by tests that draw text.
#[cfg(test)]
pub fn test_font_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join("fonts").join("DejaVuSans.ttf")
}

#[cfg(test)]
pub fn test_fonts() -> crate::render::fonts::FontSet {
    use crate::config::ImageSettings;
    use crate::render::fonts::FontSet;

    FontSet::load(&ImageSettings {
        body_font: Some(test_font_path()),
        ..ImageSettings::default()
    })
}
