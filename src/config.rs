//! User configuration for the `glst` application.

use crate::{
    constants::{DEFAULT_HOST, DEFAULT_REMOTE, ST_CFG_FILE_NAME},
    errors::{StError, StResult},
    gitlab::host_from_remote,
};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Environment variable that overrides the configured GitLab token.
const TOKEN_ENV: &str = "GITLAB_TOKEN";

/// The `glst` configuration, stored as TOML in the user's home directory.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StConfig {
    /// Hostname of the GitLab instance. Derived from the remote URL if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Personal access token for the GitLab API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Prefix for branches created by `glst stack save`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_prefix: Option<String>,
    /// Name of the git remote that hosts the stack's branches.
    pub remote: String,
}

impl Default for StConfig {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            branch_prefix: None,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl StConfig {
    /// Loads the configuration from disk, falling back to defaults if no file exists. The
    /// `GITLAB_TOKEN` environment variable takes precedence over the configured token.
    pub fn load() -> StResult<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|source| StError::StoreIo { path, source })?;
                Self::parse(&raw)?
            }
            _ => Self::default(),
        };

        if let Ok(token) = env::var(TOKEN_ENV) {
            if !token.is_empty() {
                config.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Parses a configuration from its TOML form.
    pub fn parse(raw: &str) -> StResult<Self> {
        toml::from_str(raw).map_err(Into::into)
    }

    /// Returns the GitLab token, or an error pointing the user at the config file.
    pub fn token(&self) -> StResult<&str> {
        self.token.as_deref().filter(|t| !t.is_empty()).ok_or_else(|| {
            StError::MissingToken(
                config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ST_CFG_FILE_NAME.to_string()),
            )
        })
    }

    /// Returns the GitLab instance to query for a project hosted at `remote_url`: the configured
    /// host, the host of the remote, or `gitlab.com`, in that order.
    pub fn api_host(&self, remote_url: &str) -> String {
        self.host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .map(ToOwned::to_owned)
            .or_else(|| host_from_remote(remote_url))
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Returns the configured branch prefix, if one is set and non-empty.
    pub fn branch_prefix(&self) -> Option<&str> {
        self.branch_prefix.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Returns the path to the configuration file, or [None] if the home directory is unknown.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(ST_CFG_FILE_NAME))
}
