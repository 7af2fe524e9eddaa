use std::fs;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use imageproc::drawing::text_size;
use spdlog::{info, warn};

use crate::config::ImageSettings;
use crate::render::text_layout::{BlockRole, HeuristicMeasure, TextMeasure};

pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path)
        .with_context(|| format!("Error reading font {}", path.display()))?;
    FontVec::try_from_vec(bytes)
        .with_context(|| format!("Invalid font file {}", path.display()))
}

fn load_optional(path: Option<&Path>) -> Option<FontVec> {
    let path = path?;
    match load_font(path) {
        Ok(font) => {
            info!("Loaded font {}", path.display());
            Some(font)
        }
        Err(e) => {
            warn!("{:#}", e);
            None
        }
    }
}

/// Fonts used for the title and for the body/author blocks. Either one stands
/// in for the other when only one could be loaded.
pub struct FontSet {
    title: Option<FontVec>,
    body: Option<FontVec>,
    fallback: HeuristicMeasure,
}

impl FontSet {
    pub fn load(settings: &ImageSettings) -> FontSet {
        let title = load_optional(settings.title_font.as_deref());
        let body = load_optional(settings.body_font.as_deref());
        if title.is_none() && body.is_none() {
            warn!("No font could be loaded, images will be rendered without text");
        }

        FontSet {
            title,
            body,
            fallback: HeuristicMeasure { char_width_ratio: settings.char_width_ratio },
        }
    }

    pub fn empty(char_width_ratio: f32) -> FontSet {
        FontSet {
            title: None,
            body: None,
            fallback: HeuristicMeasure { char_width_ratio },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    pub fn for_role(&self, role: BlockRole) -> Option<&FontVec> {
        match role {
            BlockRole::Title => self.title.as_ref().or(self.body.as_ref()),
            BlockRole::Body | BlockRole::Author => self.body.as_ref().or(self.title.as_ref()),
        }
    }
}

impl TextMeasure for FontSet {
    fn measure(&self, role: BlockRole, text: &str, font_size: f32) -> f32 {
        match self.for_role(role) {
            Some(font) => text_size(PxScale::from(font_size), font, text).0 as f32,
            None => self.fallback.measure(role, text, font_size),
        }
    }
}
