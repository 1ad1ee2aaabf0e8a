use serde::{Deserialize, Serialize};

/// Zoom limits and animation timing for the layout editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min:         f64,
    pub max:         f64,
    /// Length of one zoom animation.
    pub duration_ms: u64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min:         0.0,
            max:         3.0,
            duration_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// SQLite database holding every save.
    pub db_path:           String,
    /// Directory containing facilities.json.
    pub data_dir:          String,
    /// Where exported saves are written.
    pub export_dir:        String,
    /// Base name for newly created saves.
    pub default_save_name: String,
    /// Window title shown when no save is open.
    pub window_title:      String,
    pub zoom:              ZoomSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            db_path:           "./data.db".to_string(),
            data_dir:          "./data".to_string(),
            export_dir:        "./exports".to_string(),
            default_save_name: crate::store::DEFAULT_SAVE_NAME.to_string(),
            window_title:      "Base Planner".to_string(),
            zoom:              ZoomSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use EditorConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// In-memory database, defaults everywhere else.
    pub fn default_test() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let zoom = &self.zoom;
        anyhow::ensure!(
            zoom.min.is_finite() && zoom.max.is_finite(),
            "Zoom limits must be finite, got [{}, {}]",
            zoom.min,
            zoom.max
        );
        anyhow::ensure!(
            zoom.min <= zoom.max,
            "Zoom minimum {} exceeds maximum {}",
            zoom.min,
            zoom.max
        );
        crate::store::validate_save_name(&self.default_save_name)
            .map_err(|e| anyhow::anyhow!("default_save_name: {e}"))?;
        Ok(())
    }

    /// Window title for the active save, or the plain title when none is open.
    pub fn title_for(&self, save: Option<&str>) -> String {
        match save {
            Some(name) => format!("{} • {name}", self.window_title),
            None => self.window_title.clone(),
        }
    }
}
