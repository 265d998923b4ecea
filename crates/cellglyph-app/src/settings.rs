// Settings persistence: what to render and how, read from a JSON file.
// Uses the platform config dir: e.g. ~/Library/Application Support/cellglyph/settings.json
// on macOS, ~/.config/cellglyph/settings.json on Linux.

use std::path::{Path, PathBuf};

use cellglyph_core::{Color, RendererConfig, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub renderer: RendererConfig,
    /// Output image size in pixels.
    #[serde(default = "default_viewport")]
    pub viewport: Size,
    /// Cell size in pixels. Derived from the font when absent.
    #[serde(default)]
    pub cell: Option<Size>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_text")]
    pub text: String,
}

fn default_viewport() -> Size {
    Size::new(800.0, 600.0)
}

fn default_font_size() -> f32 {
    16.0
}

fn default_output() -> PathBuf {
    PathBuf::from("cellglyph.png")
}

fn default_text() -> String {
    "cellglyph\n\nThe quick brown fox jumps over the lazy dog.\n0123456789 !@#$%^&*()[]{}<>".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            viewport: default_viewport(),
            cell: None,
            font_size: default_font_size(),
            output: default_output(),
            text: default_text(),
        }
    }
}

impl Settings {
    pub fn foreground(&self) -> Color {
        self.renderer.foreground
    }

    pub fn background(&self) -> Color {
        self.renderer.clear_color
    }
}

pub fn settings_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("cellglyph").join("settings.json"))
}

/// Load settings from `path`, or the default location when `None`.
/// A missing file yields defaults; an unreadable one is logged and ignored.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = match path.map(Path::to_path_buf).or_else(settings_path) {
        Some(p) => p,
        None => return Settings::default(),
    };

    match std::fs::read_to_string(&path) {
        Ok(data) => parse_settings(&data).unwrap_or_else(|e| {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            Settings::default()
        }),
        Err(e) => {
            log::debug!("No settings at {} ({}), using defaults", path.display(), e);
            Settings::default()
        }
    }
}

fn parse_settings(data: &str) -> serde_json::Result<Settings> {
    serde_json::from_str(data)
}
