//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format
//! configuration files, with support for command-line overrides. A missing
//! config file is not an error: every setting has a default.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{ByteSize, Config, LimitsConfig, PodConfig};

// =============================================================================
// Constants - Default Values
// =============================================================================

const ENV_CONFIG_FILE: &str = "PODFM_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".podfmconfig";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid byte size '{value}': {message}")]
    InvalidByteSize { value: String, message: String },

    #[error("invalid integer '{value}': {source}")]
    InvalidInteger {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid override key '{key}': expected section.key")]
    InvalidOverrideKey { key: String },
}

/// Result type for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path; when set, the file must exist.
    pub config_file: Option<PathBuf>,
    /// `section.key=value` overrides applied on top of the file.
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Reading
// =============================================================================

/// Read configuration from the located file (if any) and apply overrides.
///
/// File location order: the explicit `config_file`, the `PODFM_CONFIG_FILE`
/// environment variable, then `~/.podfmconfig` if it exists.
pub fn read_config(source: &ConfigSource) -> ConfigResult<Config> {
    let mut map = match locate_config_file(source)? {
        Some(path) => load_ini(&path)?,
        None => IniMap::new(),
    };
    apply_overrides(&mut map, &source.overrides)?;
    build_config(&map)
}

fn locate_config_file(source: &ConfigSource) -> ConfigResult<Option<PathBuf>> {
    if let Some(path) = &source.config_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
        return Ok(Some(path.clone()));
    }

    if let Ok(value) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(value);
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path));
        }
        return Ok(Some(path));
    }

    if let Ok(home) = env::var("HOME") {
        let path = Path::new(&home).join(DEFAULT_CONFIG_FILENAME);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

fn load_ini(path: &Path) -> ConfigResult<IniMap> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|message| ConfigError::ParseError {
        path: path.to_path_buf(),
        message,
    })
}

fn apply_overrides(map: &mut IniMap, overrides: &[(String, String)]) -> ConfigResult<()> {
    for (key, value) in overrides {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| ConfigError::InvalidOverrideKey { key: key.clone() })?;
        map.entry(section.to_ascii_lowercase())
            .or_default()
            .insert(name.to_ascii_lowercase(), Some(value.clone()));
    }
    Ok(())
}

fn get(map: &IniMap, section: &str, key: &str) -> Option<String> {
    map.get(section)?.get(key)?.clone()
}

fn build_config(map: &IniMap) -> ConfigResult<Config> {
    let pod = PodConfig {
        url: get(map, "pod", "url"),
        token: get(map, "pod", "token"),
    };

    let mut limits = LimitsConfig::default();
    if let Some(value) = get(map, "limits", "max_file_size") {
        limits.max_file_size = ByteSize(parse_byte_size(&value)?);
    }
    if let Some(value) = get(map, "limits", "max_batch_size") {
        limits.max_batch_size = ByteSize(parse_byte_size(&value)?);
    }
    if let Some(value) = get(map, "limits", "max_name_length") {
        limits.max_name_length = parse_usize(&value)?;
    }
    if let Some(value) = get(map, "limits", "max_path_length") {
        limits.max_path_length = parse_usize(&value)?;
    }
    if let Some(value) = get(map, "limits", "allowed_content_types") {
        limits.allowed_content_types = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    Ok(Config { pod, limits })
}

fn parse_usize(value: &str) -> ConfigResult<usize> {
    value.trim().parse().map_err(|source| ConfigError::InvalidInteger {
        value: value.to_string(),
        source,
    })
}

/// Parse a human-readable byte size: a plain number of bytes or a number
/// with a KB/MB/GB/TB suffix (single-letter forms accepted).
pub fn parse_byte_size(value: &str) -> ConfigResult<u64> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);

    if digits.is_empty() {
        return Err(ConfigError::InvalidByteSize {
            value: value.to_string(),
            message: "missing digits".to_string(),
        });
    }

    let count: u64 = digits
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidByteSize {
            value: value.to_string(),
            message: e.to_string(),
        })?;

    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        "T" | "TB" => 1024u64.pow(4),
        other => {
            return Err(ConfigError::InvalidByteSize {
                value: value.to_string(),
                message: format!("unknown suffix '{}'", other),
            })
        }
    };

    count
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::InvalidByteSize {
            value: value.to_string(),
            message: "value overflows".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_byte_sizes() {
        assert_eq!(parse_byte_size("1024").unwrap(), 1024);
        assert_eq!(parse_byte_size("100MB").unwrap(), 100 * 1024 * 1024);
        assert_eq!(parse_byte_size("1 GB").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_byte_size("2k").unwrap(), 2048);
        assert!(parse_byte_size("MB").is_err());
        assert!(parse_byte_size("10XB").is_err());
    }

    #[test]
    fn defaults_from_empty_map() {
        let config = build_config(&IniMap::new()).unwrap();
        assert_eq!(config.limits.max_file_size, ByteSize(100 * 1024 * 1024));
        assert_eq!(config.limits.max_batch_size, ByteSize(500 * 1024 * 1024));
        assert_eq!(config.limits.max_name_length, 255);
        assert_eq!(config.limits.max_path_length, 4096);
        assert!(config.limits.allowed_content_types.contains("text/plain"));
        assert!(config.pod.url.is_none());
    }

    #[test]
    fn reads_config_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[pod]\nurl = https://storage.example\n\n[limits]\nmax_file_size = 10MB\n"
        )
        .unwrap();

        let source = ConfigSource {
            config_file: Some(file.path().to_path_buf()),
            overrides: vec![("limits.max_name_length".to_string(), "64".to_string())],
        };
        let config = read_config(&source).unwrap();

        assert_eq!(config.pod.url.as_deref(), Some("https://storage.example"));
        assert_eq!(config.limits.max_file_size, ByteSize(10 * 1024 * 1024));
        assert_eq!(config.limits.max_name_length, 64);
        // Untouched settings keep their defaults.
        assert_eq!(config.limits.max_path_length, 4096);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let source = ConfigSource {
            config_file: Some(PathBuf::from("/nonexistent/podfm.ini")),
            overrides: Vec::new(),
        };
        assert!(matches!(
            read_config(&source),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn bad_override_key_is_rejected() {
        let mut map = IniMap::new();
        let overrides = vec![("nodot".to_string(), "value".to_string())];
        assert!(matches!(
            apply_overrides(&mut map, &overrides),
            Err(ConfigError::InvalidOverrideKey { .. })
        ));
    }
}
