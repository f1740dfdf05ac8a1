//! Configuration persistence for snapmark settings

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl ShapeColor {
    pub const RED: ShapeColor = ShapeColor {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: ShapeColor = ShapeColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build from 8-bit channels
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

}

impl From<ShapeColor> for tiny_skia::Color {
    fn from(c: ShapeColor) -> Self {
        tiny_skia::Color::from_rgba(c.r, c.g, c.b, 1.0).unwrap_or(tiny_skia::Color::BLACK)
    }
}

/// Where saved screenshots go when the host does not pick a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

impl SaveLocation {
    /// Resolve the folder, falling back to `~/Pictures` or `~/Documents`
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            SaveLocation::Pictures => {
                dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            }
            SaveLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
        }
    }
}

/// Look and feel of the selection chrome and annotation strokes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorStyle {
    /// Padding around the selection inside the overlay, in logical pixels
    pub margin: i32,
    /// Radius of the resize handles
    pub handle_radius: f32,
    /// Selection border width
    pub border_width: f32,
    /// Selection border and handle outline color
    pub border_color: ShapeColor,
    /// Handle fill color
    pub handle_fill: ShapeColor,
    /// Annotation stroke/fill color
    pub annotation_color: ShapeColor,
    /// Annotation stroke width
    pub annotation_width: f32,
    /// Pointer travel before a press becomes a drag
    pub drag_threshold: i32,
    /// Distance at which a handle reacts to hover
    pub anchor_tolerance: i32,
}

impl Default for EditorStyle {
    fn default() -> Self {
        Self {
            margin: 7,
            handle_radius: 5.0,
            border_width: 2.0,
            border_color: ShapeColor::from_rgb_u8(0x67, 0xba, 0xde),
            handle_fill: ShapeColor::WHITE,
            annotation_color: ShapeColor::RED,
            annotation_width: 4.0,
            drag_threshold: 10,
            anchor_tolerance: 10,
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapmarkConfig {
    /// Copy the final image to the clipboard when a capture completes
    pub add_to_clipboard: bool,
    /// Folder for saved screenshots
    pub save_location: SaveLocation,
    /// Selection and annotation styling
    pub style: EditorStyle,
}

impl Default for SnapmarkConfig {
    fn default() -> Self {
        Self {
            add_to_clipboard: true,
            save_location: SaveLocation::Pictures,
            style: EditorStyle::default(),
        }
    }
}

impl SnapmarkConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "snapmark";

    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable.
    ///
    /// A missing file is created with the defaults so it can be edited.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            log::info!("Writing default config to {}", path.display());
            let config = Self::default();
            config.save();
            return config;
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("Could not read config {}: {:?}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&text) {
            Ok(config) => config.validated(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Replace values the editor cannot draw with their defaults
    fn validated(mut self) -> Self {
        if self.style.margin < 1 {
            log::warn!(
                "Overlay margin must be at least 1, ignoring {}",
                self.style.margin
            );
            self.style.margin = EditorStyle::default().margin;
        }
        self
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::path() {
            Some(path) => {
                if let Err(err) = self.save_to(&path) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            None => log::error!("Could not resolve config directory for saving"),
        }
    }

    /// Save configuration to a specific file, creating parent folders
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Default file path for a screenshot saved right now
    pub fn default_save_path(&self) -> Option<PathBuf> {
        let mut path = self.save_location.dir()?;
        let name = chrono::Local::now()
            .format("Screenshot_%Y-%m-%d_%H-%M-%S.png")
            .to_string();
        path.push(name);
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_chrome() {
        let style = EditorStyle::default();
        assert_eq!(style.margin, 7);
        assert_eq!(style.border_color, ShapeColor::from_rgb_u8(0x67, 0xba, 0xde));
        assert_eq!(style.annotation_color, ShapeColor::RED);
        assert_eq!(style.drag_threshold, 10);
        assert_eq!(style.anchor_tolerance, 10);
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = SnapmarkConfig::default();
        config.add_to_clipboard = false;
        config.style.annotation_width = 6.0;
        config.save_to(&path).unwrap();

        assert_eq!(SnapmarkConfig::load_from(&path), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"style":{"margin":3}}"#).unwrap();

        let config = SnapmarkConfig::load_from(&path);
        assert_eq!(config.style.margin, 3);
        assert_eq!(config.style.handle_radius, 5.0);
        assert!(config.add_to_clipboard);
    }

    #[test]
    fn margin_below_one_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"style":{"margin":0,"drag_threshold":4}}"#).unwrap();

        let config = SnapmarkConfig::load_from(&path);
        assert_eq!(config.style.margin, 7);
        assert_eq!(config.style.drag_threshold, 4);
    }

    #[test]
    fn corrupt_or_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(SnapmarkConfig::load_from(&path), SnapmarkConfig::default());

        fs::write(&path, "{not json").unwrap();
        assert_eq!(SnapmarkConfig::load_from(&path), SnapmarkConfig::default());
    }
}
