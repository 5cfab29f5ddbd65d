//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::attachment::AttachmentPolicy;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// OCR capture settings
    pub ocr: OcrSettings,
    /// Generic file attachment limits
    pub attachments: AttachmentSettings,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Seed the builder with the bundled sample tests
    pub load_sample_data: bool,
    /// View shown when the dashboard opens
    pub start_view: StartView,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            load_sample_data: true,
            start_view: StartView::Home,
        }
    }
}

/// Persistable dashboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartView {
    #[default]
    Home,
    Builder,
    Settings,
}

/// Recognition backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// Local `tesseract` command line tool
    #[default]
    Tesseract,
    /// Canned text, for machines without an OCR engine
    Demo,
}

impl OcrBackend {
    pub fn name(&self) -> &'static str {
        match self {
            OcrBackend::Tesseract => "Tesseract",
            OcrBackend::Demo => "Demo",
        }
    }
}

/// OCR capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Recognition backend
    pub backend: OcrBackend,
    /// Language model passed to the engine (e.g. "eng")
    pub language: String,
    /// Path or name of the tesseract executable
    pub tesseract_path: String,
    /// Interval between synthetic progress ticks
    pub progress_interval_ms: u64,
    /// Percent added per progress tick
    pub progress_step: u8,
    /// Synthetic progress never passes this value before the result arrives
    pub progress_cap: u8,
    /// Longest edge of the preview image in pixels
    pub preview_max_edge: u32,
    /// Text returned by the demo backend
    pub demo_text: String,
    /// Simulated recognition time for the demo backend
    pub demo_delay_ms: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Tesseract,
            language: "eng".to_string(),
            tesseract_path: "tesseract".to_string(),
            progress_interval_ms: 200,
            progress_step: 10,
            progress_cap: 90,
            preview_max_edge: 640,
            demo_text: "Which organelle is known as the powerhouse of the cell?".to_string(),
            demo_delay_ms: 1500,
        }
    }
}

/// Limits for generic question attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSettings {
    /// Maximum attachment size in MB
    pub max_size_mb: u32,
    /// Accepted file extensions (lowercase, without dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for AttachmentSettings {
    fn default() -> Self {
        Self {
            max_size_mb: 5,
            allowed_extensions: ["pdf", "doc", "docx", "png", "jpg", "jpeg"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl AttachmentSettings {
    /// Build the validation policy for these settings
    pub fn policy(&self) -> AttachmentPolicy {
        AttachmentPolicy {
            max_bytes: u64::from(self.max_size_mb) * 1024 * 1024,
            allowed_extensions: self.allowed_extensions.clone(),
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "quizforge", "QuizForge")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Default location of the settings file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert!(config.general.load_sample_data);
        assert_eq!(config.general.start_view, StartView::Home);

        assert_eq!(config.ocr.backend, OcrBackend::Tesseract);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.progress_interval_ms, 200);
        assert_eq!(config.ocr.progress_step, 10);
        assert_eq!(config.ocr.progress_cap, 90);

        assert_eq!(config.attachments.max_size_mb, 5);
        assert!(config.attachments.allowed_extensions.contains(&"pdf".to_string()));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = AppConfig::default();
        config.ocr.backend = OcrBackend::Demo;
        config.ocr.language = "deu".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
        assert!(toml_str.contains("backend = \"demo\""));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[ocr]\nlanguage = \"fra\"\n").unwrap();

        assert_eq!(parsed.ocr.language, "fra");
        assert_eq!(parsed.ocr.progress_cap, 90);
        assert_eq!(parsed.attachments, AttachmentSettings::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.attachments.max_size_mb = 12;

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.attachments.max_size_mb, 12);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_attachment_policy_from_settings() {
        let settings = AttachmentSettings {
            max_size_mb: 2,
            allowed_extensions: vec!["pdf".to_string()],
        };

        let policy = settings.policy();
        assert_eq!(policy.max_bytes, 2 * 1024 * 1024);
        assert_eq!(policy.allowed_extensions, vec!["pdf".to_string()]);
    }
}
