//! Configuration schema types
//!
//! Every section has defaults, so a backup can run with no configuration
//! file at all.

use serde::{Deserialize, Serialize};

/// Default host of the ELN platform
pub const DEFAULT_BASE_URL: &str = "https://os.deeporigin.io";

/// Upper bound on workers per phase when nothing else limits it
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Main backup configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Mirror step settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BackupConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.export.validate()?;
        self.sync.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// ELN API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the platform; API paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Token file location; defaults to `$HOME/.eln-backup/tokens.json`
    #[serde(default)]
    pub tokens_path: Option<String>,

    /// Organization id sent as `x-org-id`; falls back to the token file
    #[serde(default)]
    pub organization_id: Option<String>,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| format!("api.base_url is not a valid URL: {e}"))?;

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be > 0".to_string());
        }

        if let Some(org) = &self.organization_id {
            if org.trim().is_empty() {
                return Err("api.organization_id cannot be blank when set".to_string());
            }
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            tokens_path: None,
            organization_id: None,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Workers for the workspace, database and notebook phases
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Workers for the file download phase
    #[serde(default = "default_max_workers")]
    pub file_workers: usize,

    /// Re-download existing files whose size differs from the listed size
    #[serde(default)]
    pub verify_file_size: bool,

    /// Draw progress bars on an interactive terminal
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 || self.max_workers > 64 {
            return Err(format!(
                "export.max_workers must be between 1 and 64, got {}",
                self.max_workers
            ));
        }

        if self.file_workers == 0 || self.file_workers > 64 {
            return Err(format!(
                "export.file_workers must be between 1 and 64, got {}",
                self.file_workers
            ));
        }

        Ok(())
    }

    /// Workers for row phases, capped by the host's parallelism
    pub fn effective_workers(&self) -> usize {
        cap_to_parallelism(self.max_workers)
    }

    /// Workers for the file phase, capped by the host's parallelism
    pub fn effective_file_workers(&self) -> usize {
        cap_to_parallelism(self.file_workers)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            file_workers: default_max_workers(),
            verify_file_size: false,
            show_progress: true,
        }
    }
}

/// Clamp a requested worker count to `1..=available_parallelism`
pub fn cap_to_parallelism(requested: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.min(available).max(1)
}

/// Mirror step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Executable invoked as `<tool> sync <outdir> <s3dir>`
    #[serde(default = "default_sync_tool")]
    pub tool: String,
}

impl SyncConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tool.trim().is_empty() {
            return Err("sync.tool cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tool: default_sync_tool(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_true() -> bool {
    true
}

fn default_sync_tool() -> String {
    "s5cmd".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
