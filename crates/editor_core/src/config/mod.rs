//! Configuration system

pub use serde::{Deserialize, Serialize};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Whether the editor starts in edit mode (otherwise play mode)
    pub start_in_edit_mode: bool,
    /// `env_logger` filter used when no `RUST_LOG` is set
    pub log_level: String,
    /// Undo history settings
    pub undo: UndoConfig,
    /// Picking settings
    pub picking: PickingConfig,
    /// Component lookup settings
    pub components: ComponentsConfig,
    /// Viewport settings
    pub viewport: ViewportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            start_in_edit_mode: true,
            log_level: "info".to_string(),
            undo: UndoConfig::default(),
            picking: PickingConfig::default(),
            components: ComponentsConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl Config for EditorConfig {}

/// Undo history configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Maximum number of undo entries kept; `None` keeps everything
    pub max_history: Option<usize>,
}

/// Picking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Whether hover enter/exit is tracked at all
    pub hover_enabled: bool,
    /// Hits further than this along the ray are ignored
    pub max_distance: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            hover_enabled: true,
            max_distance: 1.0e9,
        }
    }
}

/// Component lookup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Search locations for component names, in lookup order
    pub search_locations: Vec<String>,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            search_locations: vec!["engine".to_string(), "project".to_string()],
        }
    }
}

/// Viewport configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();

        assert!(config.start_in_edit_mode);
        assert_eq!(config.undo.max_history, None);
        assert_eq!(config.components.search_locations, vec!["engine", "project"]);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EditorConfig = toml::from_str(
            r#"
            start_in_edit_mode = false

            [undo]
            max_history = 50
            "#,
        )
        .unwrap();

        assert!(!config.start_in_edit_mode);
        assert_eq!(config.undo.max_history, Some(50));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.viewport, ViewportConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = EditorConfig::default();
        config.picking.hover_enabled = false;

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let parsed: EditorConfig = ron::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EditorConfig::default().save_to_file("editor.json");

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_load_toml() {
        let path = std::env::temp_dir().join(format!("editor_core_config_{}.toml", std::process::id()));
        let mut config = EditorConfig::default();
        config.viewport.width = 640;

        config.save_to_file(&path).unwrap();
        let loaded = EditorConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
