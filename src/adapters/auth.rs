//! Authentication store
//!
//! The backup needs an access token and an organization id for every API
//! call. [`AuthProvider`] abstracts where they come from; [`TokenFileAuth`]
//! keeps them in a JSON token file and can prompt for a new token.

use crate::config::{secret_string, ApiConfig, SecretString};
use crate::domain::{BackupError, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the stored access token
pub const ACCESS_TOKEN_ENV: &str = "ELN_BACKUP_ACCESS_TOKEN";

/// Stored tokens
#[derive(Clone)]
pub struct Tokens {
    pub access: SecretString,
    pub refresh: Option<SecretString>,
}

/// Account settings needed alongside the tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub organization_id: String,
}

/// Everything an API client needs to authenticate a request
#[derive(Clone)]
pub struct Credentials {
    pub access_token: SecretString,
    pub organization_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

/// Source of API credentials
pub trait AuthProvider: Send + Sync {
    /// True when an access token is available without prompting
    fn tokens_exist(&self) -> bool;

    /// Obtain and persist tokens, interactively if needed
    fn authenticate(&self) -> Result<()>;

    fn get_tokens(&self) -> Result<Tokens>;

    fn get_config(&self) -> Result<AuthSettings>;

    /// Tokens and settings combined for an API client
    fn credentials(&self) -> Result<Credentials> {
        let tokens = self.get_tokens()?;
        let settings = self.get_config()?;
        Ok(Credentials {
            access_token: tokens.access,
            organization_id: settings.organization_id,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct TokenFile {
    access: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<String>,
}

/// Token file backed [`AuthProvider`]
///
/// The file holds `{"access": "...", "refresh": "...", "organization_id": "..."}`.
/// A configured organization id wins over the one in the file, and
/// `ELN_BACKUP_ACCESS_TOKEN` wins over the stored access token.
#[derive(Debug, Clone)]
pub struct TokenFileAuth {
    path: PathBuf,
    organization_id: Option<String>,
    env_token: Option<String>,
}

impl TokenFileAuth {
    pub fn new(path: impl Into<PathBuf>, organization_id: Option<String>) -> Self {
        Self {
            path: path.into(),
            organization_id,
            env_token: Some(ACCESS_TOKEN_ENV.to_string()),
        }
    }

    /// Provider for the `[api]` configuration section
    ///
    /// # Errors
    ///
    /// Fails when no token path is configured and `HOME` is unset.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let path = match &config.tokens_path {
            Some(path) => PathBuf::from(path),
            None => default_tokens_path()?,
        };
        Ok(Self::new(path, config.organization_id.clone()))
    }

    /// Ignore the access token environment variable
    pub fn without_env(mut self) -> Self {
        self.env_token = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn env_access_token(&self) -> Option<String> {
        let name = self.env_token.as_deref()?;
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    fn read_token_file(&self) -> Result<TokenFile> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            BackupError::Authentication(format!(
                "Failed to read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            BackupError::Authentication(format!(
                "Invalid token file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_token_file(&self, tokens: &TokenFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(path = %self.path.display(), "Saved access token");
        Ok(())
    }

    /// Prompt on `output` and read the token (and organization id, when
    /// none is known yet) from `input`
    pub fn authenticate_from<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<()> {
        let existing = self.read_token_file().ok();
        let known_org = self
            .organization_id
            .clone()
            .or_else(|| existing.as_ref().and_then(|t| t.organization_id.clone()));

        write!(output, "Access token: ")?;
        output.flush()?;
        let access = read_trimmed_line(input)?;
        if access.is_empty() {
            return Err(BackupError::Authentication(
                "No access token entered".to_string(),
            ));
        }

        let organization_id = match known_org {
            Some(org) => Some(org),
            None => {
                write!(output, "Organization id: ")?;
                output.flush()?;
                let org = read_trimmed_line(input)?;
                if org.is_empty() {
                    return Err(BackupError::Authentication(
                        "No organization id entered".to_string(),
                    ));
                }
                Some(org)
            }
        };

        self.write_token_file(&TokenFile {
            access: secret_string(access),
            refresh: None,
            organization_id,
        })
    }
}

impl AuthProvider for TokenFileAuth {
    fn tokens_exist(&self) -> bool {
        if self.env_access_token().is_some() {
            return true;
        }
        self.read_token_file()
            .map(|t| !t.access.expose_secret().is_blank())
            .unwrap_or(false)
    }

    fn authenticate(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        self.authenticate_from(&mut input, &mut output)
    }

    fn get_tokens(&self) -> Result<Tokens> {
        if let Some(token) = self.env_access_token() {
            return Ok(Tokens {
                access: secret_string(token),
                refresh: None,
            });
        }

        let file = self.read_token_file()?;
        if file.access.expose_secret().is_blank() {
            return Err(BackupError::Authentication(format!(
                "Token file {} has an empty access token",
                self.path.display()
            )));
        }
        Ok(Tokens {
            access: file.access,
            refresh: file.refresh,
        })
    }

    fn get_config(&self) -> Result<AuthSettings> {
        if let Some(org) = &self.organization_id {
            return Ok(AuthSettings {
                organization_id: org.clone(),
            });
        }

        self.read_token_file()
            .ok()
            .and_then(|t| t.organization_id)
            .filter(|org| !org.trim().is_empty())
            .map(|organization_id| AuthSettings { organization_id })
            .ok_or_else(|| {
                BackupError::Authentication(
                    "No organization id configured; set api.organization_id or authenticate again"
                        .to_string(),
                )
            })
    }
}

fn read_trimmed_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// `$HOME/.eln-backup/tokens.json`
pub fn default_tokens_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        BackupError::Configuration(
            "HOME is not set; configure api.tokens_path explicitly".to_string(),
        )
    })?;
    Ok(PathBuf::from(home).join(".eln-backup").join("tokens.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_no_tokens() {
        let dir = TempDir::new().unwrap();
        let auth = TokenFileAuth::new(dir.path().join("tokens.json"), None).without_env();
        assert!(!auth.tokens_exist());
        assert!(matches!(
            auth.get_tokens(),
            Err(BackupError::Authentication(_))
        ));
    }

    #[test]
    fn test_reads_token_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(
            &path,
            r#"{"access": "tok-1", "refresh": "ref-1", "organization_id": "org-a"}"#,
        )
        .unwrap();

        let auth = TokenFileAuth::new(&path, None).without_env();
        assert!(auth.tokens_exist());

        let credentials = auth.credentials().unwrap();
        assert_eq!(credentials.access_token.expose_secret().as_ref(), "tok-1");
        assert_eq!(credentials.organization_id, "org-a");
        assert!(!format!("{credentials:?}").contains("tok-1"));
    }

    #[test]
    fn test_configured_org_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, r#"{"access": "t", "organization_id": "from-file"}"#).unwrap();

        let auth = TokenFileAuth::new(&path, Some("from-config".to_string())).without_env();
        assert_eq!(auth.get_config().unwrap().organization_id, "from-config");
    }

    #[test]
    fn test_missing_org_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, r#"{"access": "t"}"#).unwrap();

        let auth = TokenFileAuth::new(&path, None).without_env();
        assert!(auth.get_config().is_err());
    }

    #[test]
    fn test_blank_access_token_does_not_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, r#"{"access": "  "}"#).unwrap();

        let auth = TokenFileAuth::new(&path, None).without_env();
        assert!(!auth.tokens_exist());
    }

    #[test]
    fn test_authenticate_from_prompts_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tokens.json");
        let auth = TokenFileAuth::new(&path, None).without_env();

        let mut input = Cursor::new("new-token\norg-42\n");
        let mut output = Vec::new();
        auth.authenticate_from(&mut input, &mut output).unwrap();

        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("Access token"));
        assert!(prompts.contains("Organization id"));

        assert!(auth.tokens_exist());
        let credentials = auth.credentials().unwrap();
        assert_eq!(credentials.access_token.expose_secret().as_ref(), "new-token");
        assert_eq!(credentials.organization_id, "org-42");
    }

    #[test]
    fn test_authenticate_from_skips_known_org() {
        let dir = TempDir::new().unwrap();
        let auth = TokenFileAuth::new(dir.path().join("t.json"), Some("org".to_string()))
            .without_env();

        let mut input = Cursor::new("abc\n");
        let mut output = Vec::new();
        auth.authenticate_from(&mut input, &mut output).unwrap();

        assert!(!String::from_utf8(output).unwrap().contains("Organization id"));
    }

    #[test]
    fn test_authenticate_from_rejects_empty_token() {
        let dir = TempDir::new().unwrap();
        let auth = TokenFileAuth::new(dir.path().join("t.json"), Some("org".to_string()))
            .without_env();

        let mut input = Cursor::new("\n");
        let result = auth.authenticate_from(&mut input, &mut Vec::new());
        assert!(matches!(result, Err(BackupError::Authentication(_))));
        assert!(!auth.tokens_exist());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.json");
        let auth = TokenFileAuth::new(&path, Some("org".to_string())).without_env();
        auth.authenticate_from(&mut Cursor::new("abc\n"), &mut Vec::new())
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
