mod schema;

pub use schema::{Config, ExportConfig, DEFAULT_EXPORT_DECIMALS, DEFAULT_REPORT_TITLE};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_EXPORT_DECIMALS: usize = 10;

/// Get the config directory path (~/.config/pqd-score/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("pqd-score"))
}

/// Get the default config file path (~/.config/pqd-score/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Ensure a directory exists
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory at {}", dir.display()))?;
    }
    Ok(())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/pqd-score/config.yaml), and a missing default file means defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or has unknown keys
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Validate the whole config at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(scoring_errors) = crate::scoring::validate_scoring(&config.scoring()) {
        errors.extend(scoring_errors);
    }

    let export = config.export();
    if let Some(title) = &export.report_title {
        if title.trim().is_empty() {
            errors.push("export.report_title: must not be empty".to_string());
        }
    }
    if let Some(decimals) = export.decimals {
        if decimals > MAX_EXPORT_DECIMALS {
            errors.push(format!(
                "export.decimals: must be at most {}, got {}",
                MAX_EXPORT_DECIMALS, decimals
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
