use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ab_glyph::PxScale;
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use spdlog::{debug, info, warn};

use crate::config::ImageSettings;
use crate::content::ContentCategory;
use crate::render::fonts::FontSet;
use crate::render::text_layout::{layout_blocks, BlockRole, LayoutSettings, PlacedLine, TextBlock};
use crate::util::hex_color::HexColor;

const LOGO_FILE: &str = "logo.png";

/// Overlay tint for each category.
pub fn category_color(category: ContentCategory) -> HexColor {
    match category {
        ContentCategory::FreudianConcepts => HexColor::rgb(0x4a, 0x2c, 0x5a),
        ContentCategory::JungTheory => HexColor::rgb(0x1f, 0x4e, 0x5f),
        ContentCategory::LacanConcepts => HexColor::rgb(0x5c, 0x1a, 0x1b),
        ContentCategory::PracticalTips => HexColor::rgb(0x2e, 0x5e, 0x3a),
        ContentCategory::Reflection => HexColor::rgb(0x2b, 0x2d, 0x42),
    }
}

/// Text to draw on one image.
pub struct RenderJob<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub author: Option<&'a str>,
    pub category: ContentCategory,
}

pub struct ImageCompositor {
    settings: ImageSettings,
    templates_dir: PathBuf,
    fonts: FontSet,
}

impl ImageCompositor {
    pub fn new(settings: ImageSettings, templates_dir: &Path, fonts: FontSet) -> Self {
        ImageCompositor {
            settings,
            templates_dir: templates_dir.to_path_buf(),
            fonts,
        }
    }

    fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            canvas_size: self.settings.size,
            margin: self.settings.margin,
            char_width_ratio: self.settings.char_width_ratio,
            line_spacing: self.settings.line_spacing,
            block_gap: self.settings.block_gap,
        }
    }

    fn find_background(&self, category: ContentCategory) -> Option<PathBuf> {
        let names = [
            format!("background_{}.png", category.slug()),
            format!("background_{}.jpg", category.slug()),
            "background.png".to_string(),
            "background.jpg".to_string(),
        ];
        names.iter()
            .map(|n| self.templates_dir.join(n))
            .find(|p| p.is_file())
    }

    fn open_asset(path: &Path) -> Option<DynamicImage> {
        match image::open(path) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("Error opening image asset {}: {}", path.display(), e);
                None
            }
        }
    }

    fn background(&self, category: ContentCategory) -> RgbaImage {
        let size = self.settings.size;
        if let Some(path) = self.find_background(category) {
            if let Some(img) = Self::open_asset(&path) {
                debug!("Using background {}", path.display());
                return img.resize_to_fill(size, size, FilterType::Lanczos3).to_rgba8();
            }
        }
        RgbaImage::from_pixel(size, size, self.settings.background_color.0)
    }

    fn apply_overlay(&self, canvas: &mut RgbaImage, category: ContentCategory) {
        let color = category_color(category).with_alpha(self.settings.overlay_alpha);
        let layer = RgbaImage::from_pixel(canvas.width(), canvas.height(), color);
        imageops::overlay(canvas, &layer, 0, 0);
    }

    fn logo(&self) -> Option<DynamicImage> {
        let path = self.templates_dir.join(LOGO_FILE);
        if !path.is_file() {
            debug!("No logo at {}", path.display());
            return None;
        }
        Self::open_asset(&path)
    }

    fn scaled_logo(logo: &DynamicImage, max_side: u32, opacity: f32) -> RgbaImage {
        let max_side = max_side.max(1);
        let mut scaled = logo.resize(max_side, max_side, FilterType::Lanczos3).to_rgba8();
        if opacity < 1.0 {
            let opacity = opacity.clamp(0.0, 1.0);
            for pixel in scaled.pixels_mut() {
                pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
            }
        }
        scaled
    }

    fn apply_watermark(&self, canvas: &mut RgbaImage, logo: &DynamicImage) {
        let size = self.settings.size;
        let side = (size as f32 * self.settings.watermark_scale).round() as u32;
        let mark = Self::scaled_logo(logo, side, self.settings.watermark_opacity);
        let x = (size.saturating_sub(mark.width()) / 2) as i64;
        let y = (size.saturating_sub(mark.height()) / 2) as i64;
        imageops::overlay(canvas, &mark, x, y);
    }

    fn apply_small_logo(&self, canvas: &mut RgbaImage, logo: &DynamicImage) {
        let size = self.settings.size;
        let side = (size as f32 * self.settings.small_logo_scale).round() as u32;
        let small = Self::scaled_logo(logo, side, 1.0);
        let x = size.saturating_sub(small.width() + self.settings.margin) as i64;
        let y = size.saturating_sub(small.height() + self.settings.margin) as i64;
        imageops::overlay(canvas, &small, x, y);
    }

    /// Title, body and author blocks in drawing order.
    pub fn text_blocks(&self, job: &RenderJob) -> Vec<TextBlock> {
        let author = job.author
            .filter(|a| !a.trim().is_empty())
            .map(|a| format!("- {}", a.trim()))
            .unwrap_or_default();

        vec![
            TextBlock { role: BlockRole::Title, text: job.title.to_string(), font_size: self.settings.title_size },
            TextBlock { role: BlockRole::Body, text: job.text.to_string(), font_size: self.settings.body_size },
            TextBlock { role: BlockRole::Author, text: author, font_size: self.settings.author_size },
        ]
    }

    pub fn layout(&self, job: &RenderJob) -> Vec<PlacedLine> {
        layout_blocks(&self.text_blocks(job), &self.layout_settings(), &self.fonts)
    }

    fn role_color(&self, role: BlockRole) -> Rgba<u8> {
        match role {
            BlockRole::Title => self.settings.title_color.0,
            BlockRole::Body => self.settings.body_color.0,
            BlockRole::Author => self.settings.author_color.0,
        }
    }

    fn draw_text(&self, canvas: &mut RgbaImage, lines: &[PlacedLine]) {
        if self.fonts.is_empty() {
            warn!("Skipping text, no font loaded");
            return;
        }

        // Shadows go on their own transparent layer so their alpha blends with the canvas
        let offset = self.settings.shadow_offset;
        let mut shadows = RgbaImage::new(canvas.width(), canvas.height());
        for line in lines {
            if let Some(font) = self.fonts.for_role(line.role) {
                draw_text_mut(&mut shadows, self.settings.shadow_color.0, line.x + offset, line.y + offset,
                              PxScale::from(line.font_size), font, &line.text);
            }
        }
        imageops::overlay(canvas, &shadows, 0, 0);

        for line in lines {
            if let Some(font) = self.fonts.for_role(line.role) {
                draw_text_mut(canvas, self.role_color(line.role), line.x, line.y,
                              PxScale::from(line.font_size), font, &line.text);
            }
        }
    }

    /// Background, color overlay, watermark, shadowed text and corner logo.
    pub fn compose(&self, job: &RenderJob) -> RgbaImage {
        let mut canvas = self.background(job.category);
        self.apply_overlay(&mut canvas, job.category);

        let logo = self.logo();
        if let Some(ref logo) = logo {
            self.apply_watermark(&mut canvas, logo);
        }

        let lines = self.layout(job);
        self.draw_text(&mut canvas, &lines);

        if let Some(ref logo) = logo {
            self.apply_small_logo(&mut canvas, logo);
        }

        canvas
    }

    /// Composes the image and writes it as JPEG to `path`.
    pub fn render_to_file(&self, job: &RenderJob, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Error creating output dir {}", parent.display()))?;
        }

        let canvas = self.compose(job);
        let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();

        let file = File::create(path)
            .with_context(|| format!("Error creating image file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, self.settings.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .with_context(|| format!("Error encoding image {}", path.display()))?;
        writer.flush()?;

        info!("Image written to {}", path.display());
        Ok(path.to_path_buf())
    }
}
