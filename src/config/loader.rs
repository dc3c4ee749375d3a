//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BackupConfig;
use crate::domain::errors::BackupError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration, optionally from a TOML file
///
/// This function:
/// 1. Reads the TOML file, if one is given
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BackupConfig (defaults otherwise)
/// 4. Applies environment variable overrides (ELN_BACKUP_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - A given file does not exist or cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use eln_backup::config::loader::load_config;
///
/// let config = load_config(Some("eln-backup.toml")).expect("Failed to load config");
/// let defaults = load_config(None::<&str>).expect("Failed to load defaults");
/// ```
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<BackupConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path.as_ref())?,
        None => BackupConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BackupError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<BackupConfig> {
    if !path.exists() {
        return Err(BackupError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BackupError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: BackupConfig = toml::from_str(&contents)
        .map_err(|e| BackupError::Configuration(format!("Failed to parse TOML: {e}")))?;

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BackupError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BackupError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        BackupError::Configuration(format!("Invalid value for {name}: {value:?}"))
    })
}

/// Applies environment variable overrides using the ELN_BACKUP_* prefix
///
/// Environment variables follow the pattern: ELN_BACKUP_<SECTION>_<KEY>,
/// for example ELN_BACKUP_API_BASE_URL or ELN_BACKUP_EXPORT_FILE_WORKERS.
fn apply_env_overrides(config: &mut BackupConfig) -> Result<()> {
    if let Ok(val) = std::env::var("ELN_BACKUP_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("ELN_BACKUP_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("ELN_BACKUP_API_TIMEOUT_SECONDS") {
        config.api.timeout_seconds = parse_env("ELN_BACKUP_API_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("ELN_BACKUP_API_TOKENS_PATH") {
        config.api.tokens_path = Some(val);
    }
    if let Ok(val) = std::env::var("ELN_BACKUP_API_ORGANIZATION_ID") {
        config.api.organization_id = Some(val);
    }

    if let Ok(val) = std::env::var("ELN_BACKUP_EXPORT_MAX_WORKERS") {
        config.export.max_workers = parse_env("ELN_BACKUP_EXPORT_MAX_WORKERS", &val)?;
    }
    if let Ok(val) = std::env::var("ELN_BACKUP_EXPORT_FILE_WORKERS") {
        config.export.file_workers = parse_env("ELN_BACKUP_EXPORT_FILE_WORKERS", &val)?;
    }
    if let Ok(val) = std::env::var("ELN_BACKUP_EXPORT_VERIFY_FILE_SIZE") {
        config.export.verify_file_size = parse_env("ELN_BACKUP_EXPORT_VERIFY_FILE_SIZE", &val)?;
    }

    if let Ok(val) = std::env::var("ELN_BACKUP_SYNC_TOOL") {
        config.sync.tool = val;
    }

    if let Ok(val) = std::env::var("ELN_BACKUP_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("ELN_BACKUP_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("ELN_BACKUP_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
