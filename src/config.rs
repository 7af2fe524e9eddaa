use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::util::hex_color::HexColor;

#[derive(Deserialize, Debug, Clone)]
pub struct Paths {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub knowledge_base: PathBuf,
    #[serde(default = "default_counter_file")]
    pub counter_file: PathBuf,
    #[serde(default = "default_used_log")]
    pub used_log: PathBuf,
    pub caption_template: Option<PathBuf>,
}

fn default_counter_file() -> PathBuf {
    PathBuf::from("data/counter.txt")
}

fn default_used_log() -> PathBuf {
    PathBuf::from("data/used_content.txt")
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ImageSettings {
    pub size: u32,
    pub margin: u32,
    pub background_color: HexColor,
    pub overlay_alpha: f32,
    pub watermark_opacity: f32,
    pub watermark_scale: f32,
    pub small_logo_scale: f32,
    pub title_font: Option<PathBuf>,
    pub body_font: Option<PathBuf>,
    pub title_size: f32,
    pub body_size: f32,
    pub author_size: f32,
    pub title_color: HexColor,
    pub body_color: HexColor,
    pub author_color: HexColor,
    pub shadow_color: HexColor,
    pub shadow_offset: i32,
    pub char_width_ratio: f32,
    pub line_spacing: f32,
    pub block_gap: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            size: 1080,
            margin: 80,
            background_color: HexColor::rgb(0x1e, 0x1e, 0x2e),
            overlay_alpha: 0.55,
            watermark_opacity: 0.08,
            watermark_scale: 0.6,
            small_logo_scale: 0.12,
            title_font: None,
            body_font: None,
            title_size: 64.0,
            body_size: 44.0,
            author_size: 34.0,
            title_color: HexColor::rgb(0xff, 0xff, 0xff),
            body_color: HexColor::rgb(0xf5, 0xf0, 0xe6),
            author_color: HexColor::rgb(0xe0, 0xc0, 0x7a),
            shadow_color: HexColor::rgba(0, 0, 0, 160),
            shadow_offset: 3,
            char_width_ratio: 0.5,
            line_spacing: 1.25,
            block_gap: 40,
            jpeg_quality: 92,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CaptionSettings {
    pub handle: String,
    pub call_to_action: String,
    pub base_hashtags: Vec<String>,
    pub max_hashtags: usize,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        CaptionSettings {
            handle: "@portopsicanalise".to_string(),
            call_to_action: "Salve este post e compartilhe com quem precisa ler isso hoje.".to_string(),
            base_hashtags: vec![
                "#psicanalise".to_string(),
                "#psicologia".to_string(),
                "#saudemental".to_string(),
            ],
            max_hashtags: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Instagram {
    pub api_base: String,
    pub public_image_base_url: Option<String>,
    pub env_file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for Instagram {
    fn default() -> Self {
        Instagram {
            api_base: "https://graph.facebook.com/v19.0".to_string(),
            public_image_base_url: None,
            env_file: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub image: ImageSettings,
    #[serde(default)]
    pub caption: CaptionSettings,
    #[serde(default)]
    pub instagram: Instagram,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf, base_dir: &Path) -> PathBuf {
    if path.starts_with("${exe_dir}") {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        let str_path = path.to_string_lossy();
        PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy()))
    } else if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}

pub fn parse_config(cfg_content: &str, base_dir: &Path) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        templates_dir: parse_path(cfg.paths.templates_dir, base_dir),
        output_dir: parse_path(cfg.paths.output_dir, base_dir),
        knowledge_base: parse_path(cfg.paths.knowledge_base, base_dir),
        counter_file: parse_path(cfg.paths.counter_file, base_dir),
        used_log: parse_path(cfg.paths.used_log, base_dir),
        caption_template: cfg.paths.caption_template.map(|p| parse_path(p, base_dir)),
    };
    cfg.image.title_font = cfg.image.title_font.map(|p| parse_path(p, base_dir));
    cfg.image.body_font = cfg.image.body_font.map(|p| parse_path(p, base_dir));
    cfg.instagram.env_file = cfg.instagram.env_file.map(|p| parse_path(p, base_dir));
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(|p| parse_path(p, base_dir));
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let base_dir = cfg_path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&cfg_content, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::CONFIG_DATA;

    #[test]
    fn test_relative_paths_follow_config_dir() {
        let cfg = parse_config(CONFIG_DATA, Path::new("/srv/instagent")).unwrap();
        assert_eq!(cfg.paths.templates_dir, PathBuf::from("/srv/instagent/assets/templates"));
        assert_eq!(cfg.paths.output_dir, PathBuf::from("/srv/instagent/output/images"));
        assert_eq!(cfg.paths.knowledge_base, PathBuf::from("/srv/instagent/config/knowledge_base.json"));
        assert_eq!(cfg.paths.counter_file, PathBuf::from("/srv/instagent/data/counter.txt"));
        assert_eq!(cfg.paths.used_log, PathBuf::from("/srv/instagent/data/used_content.txt"));
        assert_eq!(cfg.image.title_font, Some(PathBuf::from("/opt/fonts/Title.ttf")));
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let cfg = parse_config(CONFIG_DATA, Path::new("/srv")).unwrap();
        assert_eq!(cfg.image.size, 720);
        assert_eq!(cfg.image.margin, 80);
        assert_eq!(cfg.caption.max_hashtags, 30);
        assert_eq!(cfg.caption.handle, "@portopsicanalise");
        assert_eq!(cfg.instagram.api_base, "https://graph.facebook.com/v19.0");
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let res = parse_config("[paths]\ntemplates_dir = 3", Path::new("/"));
        let err = res.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("Error parsing configuration file"));
    }
}
