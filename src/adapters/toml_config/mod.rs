// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::tracing_log::{LogFormat, LogLevel};
use crate::error::{ClipStudioError, ClipStudioResult};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CLIPSTUDIO_CONFIG";

/// Files tried, in order, when no config path is given
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["clipstudio.toml", "config/clipstudio.toml"];

/// Application configuration (`[clipstudio]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Where temp artifacts go; the system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// Encoder thread count; ffmpeg decides when unset
    pub threads: Option<usize>,
    /// Fail on missing stream metadata instead of defaulting
    pub strict_probe: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            temp_dir: None,
            threads: None,
            strict_probe: false,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> ClipStudioResult<()> {
        LogLevel::parse(&self.log_level)?;

        if self.ffmpeg_path.trim().is_empty() || self.ffprobe_path.trim().is_empty() {
            return Err(ClipStudioError::Config(
                "ffmpeg_path and ffprobe_path must not be empty".to_string(),
            ));
        }

        if self.threads == Some(0) {
            return Err(ClipStudioError::Config(
                "threads must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }

    /// Thread count clamped to the machine's CPUs
    pub fn effective_threads(&self) -> Option<usize> {
        self.threads.map(|t| t.clamp(1, num_cpus::get().max(1)))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    clipstudio: AppConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load config from file and environment, then validate
    pub fn load(explicit: Option<&Path>) -> ClipStudioResult<AppConfig> {
        let mut config = match Self::locate(explicit)? {
            Some(path) => Self::load_file(&path)?,
            None => AppConfig::default(),
        };
        Self::apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Pick the config file: explicit path, then `CLIPSTUDIO_CONFIG`, then defaults
    pub fn locate(explicit: Option<&Path>) -> ClipStudioResult<Option<PathBuf>> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = requested {
            if !path.is_file() {
                return Err(ClipStudioError::Config(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        Ok(DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file()))
    }

    pub fn load_file(path: &Path) -> ClipStudioResult<AppConfig> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClipStudioError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Deserialize config from TOML string
    pub fn parse(content: &str) -> ClipStudioResult<AppConfig> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| ClipStudioError::Config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.clipstudio)
    }

    /// Serialize config to TOML string
    pub fn serialize(config: &AppConfig) -> ClipStudioResult<String> {
        let file = ConfigFile {
            clipstudio: config.clone(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| ClipStudioError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply `CLIPSTUDIO_*` overrides read through `lookup`
    pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> ClipStudioResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CLIPSTUDIO_FFMPEG") {
            config.ffmpeg_path = value;
        }
        if let Some(value) = lookup("CLIPSTUDIO_FFPROBE") {
            config.ffprobe_path = value;
        }
        if let Some(value) = lookup("CLIPSTUDIO_TEMP_DIR") {
            config.temp_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("CLIPSTUDIO_THREADS") {
            let threads = value.trim().parse::<usize>().map_err(|e| {
                ClipStudioError::Config(format!("Invalid CLIPSTUDIO_THREADS '{}': {}", value, e))
            })?;
            config.threads = Some(threads);
        }
        if let Some(value) = lookup("CLIPSTUDIO_STRICT_PROBE") {
            config.strict_probe = parse_flag(&value).ok_or_else(|| {
                ClipStudioError::Config(format!("Invalid CLIPSTUDIO_STRICT_PROBE '{}'", value))
            })?;
        }
        if let Some(value) = lookup("CLIPSTUDIO_LOG_LEVEL") {
            config.log_level = LogLevel::parse(&value)?.as_str().to_string();
        }
        if let Some(value) = lookup("CLIPSTUDIO_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&value)?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(!config.strict_probe);
        assert_eq!(config.effective_threads(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_section() {
        let config = TomlConfigAdapter::parse(
            r#"
            [clipstudio]
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            strict_probe = true
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert!(config.strict_probe);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(TomlConfigAdapter::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert!(matches!(
            TomlConfigAdapter::parse("[clipstudio\nthreads = "),
            Err(ClipStudioError::Config(_))
        ));
        assert!(TomlConfigAdapter::parse("[clipstudio]\nlog_format = \"xml\"").is_err());
    }

    #[test]
    fn test_serialize_then_parse() {
        let config = AppConfig {
            threads: Some(2),
            temp_dir: Some(PathBuf::from("/var/tmp/clipstudio")),
            ..AppConfig::default()
        };
        let text = TomlConfigAdapter::serialize(&config).unwrap();
        assert!(text.contains("[clipstudio]"));
        assert_eq!(TomlConfigAdapter::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CLIPSTUDIO_FFMPEG", "/usr/local/bin/ffmpeg"),
            ("CLIPSTUDIO_THREADS", "3"),
            ("CLIPSTUDIO_STRICT_PROBE", "yes"),
            ("CLIPSTUDIO_LOG_LEVEL", "DEBUG"),
            ("CLIPSTUDIO_LOG_FORMAT", "compact"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        TomlConfigAdapter::apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.ffmpeg_path, "/usr/local/bin/ffmpeg");
        assert_eq!(config.threads, Some(3));
        assert!(config.strict_probe);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_bad_env_override() {
        let mut config = AppConfig::default();
        let result = TomlConfigAdapter::apply_overrides(&mut config, |k| {
            (k == "CLIPSTUDIO_THREADS").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(ClipStudioError::Config(_))));
    }

    #[test]
    fn test_validate_and_clamp_threads() {
        let zero = AppConfig {
            threads: Some(0),
            ..AppConfig::default()
        };
        assert!(zero.validate().is_err());

        let huge = AppConfig {
            threads: Some(100_000),
            ..AppConfig::default()
        };
        assert_eq!(huge.effective_threads(), Some(num_cpus::get()));

        let bad_level = AppConfig {
            log_level: "chatty".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(TomlConfigAdapter::locate(Some(&missing)).is_err());

        let present = dir.path().join("clipstudio.toml");
        std::fs::write(&present, "[clipstudio]\nthreads = 1\n").unwrap();
        assert_eq!(
            TomlConfigAdapter::locate(Some(&present)).unwrap(),
            Some(present.clone())
        );
        assert_eq!(
            TomlConfigAdapter::load_file(&present).unwrap().threads,
            Some(1)
        );
    }
}
