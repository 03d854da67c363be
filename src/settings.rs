//! Persisted engine settings and the per-user session context.
//!
//! Both are stored as JSON in the eframe storage between runs.

use crate::constants::{EXPORT_DPI, GRID_SPACING, PRINT_DPI, SCREEN_DPI};
use crate::interaction::InteractionMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-adjustable engine behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Snap dragged nodes and annotations to the grid
    pub snap_to_grid: bool,
    /// Draw the ruled grid
    pub show_grid: bool,
    /// Grid cell size in data units
    pub grid_spacing: f64,
    /// What a drag on empty canvas does
    pub mode: InteractionMode,
    /// Outline the printable area
    pub show_margins: bool,
    /// Outline the paper edge
    pub show_medium: bool,
    /// Device units per inch of the interactive canvas
    pub screen_dpi: f32,
    /// Resolution of print pages
    pub print_dpi: f32,
    /// Resolution of exported images
    pub export_dpi: f32,
    /// Page layout selected when a network is opened
    pub layout: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: false,
            show_grid: false,
            grid_spacing: GRID_SPACING,
            mode: InteractionMode::Select,
            show_margins: false,
            show_medium: false,
            screen_dpi: SCREEN_DPI,
            print_dpi: PRINT_DPI,
            export_dpi: EXPORT_DPI,
            layout: "Default".to_string(),
        }
    }
}

impl EngineSettings {
    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Context of the current editing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Session {
    /// Directory of the most recent open/save/export dialog
    pub last_directory: Option<PathBuf>,
    /// Network file being edited
    pub current_file: Option<PathBuf>,
    /// Version string of the model data set
    pub model_version: String,
    /// Path of the simulation executable the network belongs to
    pub executable_path: Option<PathBuf>,
}

impl Session {
    /// Records `path` as the current file and remembers its directory.
    pub fn open_file(&mut self, path: &Path) {
        self.current_file = Some(path.to_path_buf());
        self.remember_directory(path);
    }

    /// Remembers the directory containing `path` for the next dialog.
    pub fn remember_directory(&mut self, path: &Path) {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.last_directory = Some(dir.to_path_buf());
        }
    }

    /// A sibling of the current file with a different extension, used as the
    /// default name in export dialogs.
    pub fn suggested_name(&self, extension: &str) -> String {
        self.current_file
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| format!("{}.{extension}", s.to_string_lossy()))
            .unwrap_or_else(|| format!("network.{extension}"))
    }

    /// Serializes the session to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a session from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let s = EngineSettings::from_json(r#"{"snap_to_grid":true}"#).unwrap();
        assert!(s.snap_to_grid);
        assert_eq!(s.grid_spacing, GRID_SPACING);
        assert_eq!(s.layout, "Default");
    }

    #[test]
    fn session_tracks_file_and_directory() {
        let mut session = Session::default();
        assert_eq!(session.suggested_name("png"), "network.png");
        session.open_file(Path::new("/data/colorado/upper.json"));
        assert_eq!(session.last_directory.as_deref(), Some(Path::new("/data/colorado")));
        assert_eq!(session.suggested_name("png"), "upper.png");

        let restored = Session::from_json(&session.to_json().unwrap()).unwrap();
        assert_eq!(restored, session);
    }
}
