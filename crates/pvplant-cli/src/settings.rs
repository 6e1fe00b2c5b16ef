//! User settings for the `pvplant` command line.
//!
//! Settings live in `~/.pvplant/config.toml`. Every field has a default, so a
//! partial file (or no file at all) is valid:
//!
//! ```toml
//! [data]
//! sam_dir = "/opt/sam/libraries"
//!
//! [lookup]
//! timeout_secs = 10
//!
//! [defaults]
//! loss = 12.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pvplant_core::plant::DEFAULT_TIMEZONE;
use pvplant_core::Losses;
use pvplant_io::pvfree::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use pvplant_io::DEFAULT_CONFIG_DIR;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub lookup: LookupSettings,
    pub defaults: FormDefaults,
}

/// Where equipment libraries are read from and configurations written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory holding `CECMod.csv`, `SandiaMod.csv`, `CECInverter.csv`, `SandiaInverter.csv`
    pub sam_dir: PathBuf,
    /// Metadata rows between the header and the first device
    pub sam_metadata_rows: usize,
    pub config_dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            sam_dir: PathBuf::from("sam"),
            sam_metadata_rows: pvplant_io::sam::DEFAULT_METADATA_ROWS,
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub pvfree_url: String,
    pub timeout_secs: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            pvfree_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Values used when a form leaves a field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub tz: String,
    pub loss: f64,
    pub kpc: f64,
    pub kt: f64,
    pub kin: f64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        let losses = Losses::default();
        Self {
            tz: DEFAULT_TIMEZONE.to_string(),
            loss: losses.loss,
            kpc: losses.kpc,
            kt: losses.kt,
            kin: losses.kin,
        }
    }
}

impl Settings {
    /// `~/.pvplant`
    pub fn settings_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pvplant"))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::settings_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.data.config_dir, PathBuf::from("configurations"));
        assert_eq!(settings.data.sam_metadata_rows, 2);
        assert_eq!(settings.lookup.timeout_secs, 30);
        assert_eq!(settings.lookup.pvfree_url, "https://pvfree.herokuapp.com");
        assert_eq!(settings.defaults.loss, 14.6);
        assert_eq!(settings.defaults.tz, "America/Bogota");
    }

    #[test]
    fn test_partial_settings_parsing() {
        let toml = r#"
            [data]
            sam_dir = "/opt/sam"

            [defaults]
            kt = 1.5
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.data.sam_dir, PathBuf::from("/opt/sam"));
        assert_eq!(settings.defaults.kt, 1.5);
        assert_eq!(settings.defaults.loss, 14.6);
        assert_eq!(settings.data.config_dir, PathBuf::from("configurations"));
        assert_eq!(settings.lookup.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let mut settings = Settings::default();
        settings.lookup.timeout_secs = 5;
        settings.save_to(file.path()).unwrap();

        let loaded = Settings::load_from(file.path()).unwrap();
        assert_eq!(loaded.lookup.timeout_secs, 5);
    }

    #[test]
    fn test_malformed_settings() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[data\nsam_dir = 1").unwrap();
        assert!(Settings::load_from(file.path()).is_err());
    }
}
