//! Reads one config file; the extension picks the parser.

use crate::{error::ConfigError, loader::ConfigFormat, Config, Result, Validate};
use std::io::ErrorKind;
use std::path::Path;

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let format = detect_format(path)?;

    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let label = path.to_str();
    let config = match format {
        ConfigFormat::Yaml => super::formats::yaml::parse_with_path(&content, label)?,
        ConfigFormat::Toml => super::formats::toml::parse_with_path(&content, label)?,
        ConfigFormat::Json => super::formats::json::parse_with_path(&content, label)?,
    };
    config.validate()?;
    Ok(config)
}

fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("yml" | "yaml") => Ok(ConfigFormat::Yaml),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some("json") => Ok(ConfigFormat::Json),
        _ => Err(ConfigError::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}
