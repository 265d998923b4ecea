// Renderer configuration. Serializable so hosts can keep it in their settings file.

use serde::{Deserialize, Serialize};

use crate::Color;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Instances per batch; fixes the instance buffer size for the session.
    #[serde(default = "default_max_instances")]
    pub max_instances: usize,
    /// Edge length of the square RGBA8 atlas in pixels.
    #[serde(default = "default_atlas_dimension")]
    pub atlas_dimension: u32,
    #[serde(default = "default_clear_color")]
    pub clear_color: Color,
    /// Text color written as the dual-source color output.
    #[serde(default = "default_foreground")]
    pub foreground: Color,
}

fn default_max_instances() -> usize {
    4096
}

fn default_atlas_dimension() -> u32 {
    1024
}

fn default_clear_color() -> Color {
    Color::BLACK
}

fn default_foreground() -> Color {
    Color::WHITE
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_instances: default_max_instances(),
            atlas_dimension: default_atlas_dimension(),
            clear_color: default_clear_color(),
            foreground: default_foreground(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{ "max_instances": 128 }"#;
        let config: RendererConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_instances, 128);
        assert_eq!(config.atlas_dimension, 1024);
        assert_eq!(config.clear_color, Color::BLACK);
        assert_eq!(config.foreground, Color::WHITE);
    }

    #[test]
    fn empty_object_is_the_default() {
        let config: RendererConfig = serde_json::from_str("{}").unwrap();
        let default = RendererConfig::default();
        assert_eq!(config.max_instances, default.max_instances);
        assert_eq!(config.atlas_dimension, default.atlas_dimension);
    }
}
