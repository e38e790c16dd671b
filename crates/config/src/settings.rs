// Application settings
// Loaded from ~/.config/ownerdata/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder layout and reference table name.
///
/// Relative folders are resolved against a base directory with
/// [`Settings::resolve`]; the CLI uses the current working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder holding the single `.db` reference file
    pub reference_dir: PathBuf,
    /// Folder scanned for `.csv` / `.xlsx` lead files
    pub input_dir: PathBuf,
    /// Folder receiving `output_<name>` files
    pub output_dir: PathBuf,
    /// Table read from the reference database
    pub reference_table: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("bu_database"),
            input_dir: PathBuf::from("files_to_process"),
            output_dir: PathBuf::from("results"),
            reference_table: "bottoms_up".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ownerdata");
        config_dir.join("config.toml")
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file. A missing or malformed file is an
    /// error here.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_toml(&contents)
    }

    /// Save current settings to the default path
    pub fn save(&self) -> Result<PathBuf, String> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, self.to_toml()?).map_err(|e| e.to_string())
    }

    /// Copy with every relative folder joined onto `base`.
    pub fn resolve(&self, base: &Path) -> Self {
        let join = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base.join(p) };
        Self {
            reference_dir: join(&self.reference_dir),
            input_dir: join(&self.input_dir),
            output_dir: join(&self.output_dir),
            reference_table: self.reference_table.clone(),
        }
    }

    /// The three working folders, in reference/input/output order.
    pub fn folders(&self) -> [&Path; 3] {
        [
            self.reference_dir.as_path(),
            self.input_dir.as_path(),
            self.output_dir.as_path(),
        ]
    }

    /// Create any working folder that does not exist yet.
    pub fn ensure_folders(&self) -> Result<(), String> {
        for dir in self.folders() {
            fs::create_dir_all(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
        }
        Ok(())
    }
}
