//! Top-level application configuration.
//!
//! Configuration is stored in `config.yaml` under the admin root and includes:
//! - The API base URL
//! - List defaults (page size, search debounce)
//! - Request timeout and export directory
//! - Per-entity endpoint overrides
//!
//! The session token is not part of this file; see [`crate::session`].

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::entity::{EndpointOverrides, EntityKind, EntityProfile};
use crate::error::{AdminError, Result};
use crate::query::DEFAULT_PAGE_SIZE;
use crate::utils::{ensure_parent_dir, format_relative_path};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Keys accepted by `config get` / `config set`, besides `endpoints.<entity>.<op>`.
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "page_size",
    "search_debounce_ms",
    "request_timeout",
    "export_dir",
];

const ENDPOINT_OPS: &[&str] = &["list", "create", "update", "status", "delete"];

/// Directory holding `config.yaml` and `session.yaml`.
///
/// `OWNIFIE_ROOT` wins; otherwise the platform config directory is used.
pub fn admin_root() -> Result<PathBuf> {
    if let Ok(root) = env::var("OWNIFIE_ROOT")
        && !root.is_empty()
    {
        return Ok(PathBuf::from(root));
    }
    ProjectDirs::from("com", "ownifie", "admin")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            AdminError::Config("could not determine a configuration directory".to_string())
        })
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API base URL (default: http://localhost:5000)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records per page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Quiet period before a search term is applied (default: 300)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,

    /// Directory CSV exports are written to (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Endpoint template overrides keyed by entity name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, EndpointOverrides>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout: None,
            export_dir: None,
            endpoints: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(admin_root()?.join("config.yaml"))
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            AdminError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read config at {}: {}",
                    format_relative_path(&path),
                    e
                ),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_path()?;
        ensure_parent_dir(&path)?;

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            AdminError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to write config at {}: {}",
                    format_relative_path(&path),
                    e
                ),
            ))
        })?;
        tracing::debug!("saved config to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AdminError::InvalidPageSize(0));
        }
        for name in self.endpoints.keys() {
            name.parse::<EntityKind>()?;
        }
        Ok(())
    }

    /// Base URL, with `OWNIFIE_BASE_URL` taking precedence over the file
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var("OWNIFIE_BASE_URL")
            && !url.is_empty()
        {
            return url;
        }
        self.base_url.clone()
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Built-in profile for an entity with any configured endpoint overrides applied.
    pub fn profile_for(&self, kind: EntityKind) -> EntityProfile {
        let mut profile = kind.profile();
        if let Some(overrides) = self.endpoints.get(kind.collection()).or_else(|| {
            self.endpoints
                .iter()
                .find(|(name, _)| name.parse::<EntityKind>().ok() == Some(kind))
                .map(|(_, o)| o)
        }) {
            profile.endpoints = profile.endpoints.with_overrides(overrides);
        }
        profile
    }

    /// Read a value by key. Unset optional values read as `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some((kind, op)) = parse_endpoint_key(key)? {
            let overrides = self.endpoints.get(kind.collection());
            return Ok(overrides.and_then(|o| endpoint_slot(o, op).clone()));
        }
        match key {
            "base_url" => Ok(Some(self.base_url())),
            "page_size" => Ok(Some(self.page_size.to_string())),
            "search_debounce_ms" => Ok(Some(self.search_debounce_ms.to_string())),
            "request_timeout" => Ok(self.request_timeout.map(|t| t.to_string())),
            "export_dir" => Ok(self.export_dir.as_ref().map(|p| p.display().to_string())),
            _ => Err(unknown_key(key)),
        }
    }

    /// Set a value by key, validating it. An empty value unsets optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if let Some((kind, op)) = parse_endpoint_key(key)? {
            let overrides = self
                .endpoints
                .entry(kind.collection().to_string())
                .or_default();
            *endpoint_slot_mut(overrides, op) = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
            if *overrides == EndpointOverrides::default() {
                self.endpoints.remove(kind.collection());
            }
            return Ok(());
        }

        match key {
            "base_url" => {
                crate::remote::http::normalize_base_url(value)?;
                self.base_url = value.to_string();
            }
            "page_size" => {
                let size = parse_number::<usize>(key, value)?;
                if size == 0 {
                    return Err(AdminError::InvalidPageSize(0));
                }
                self.page_size = size;
            }
            "search_debounce_ms" => self.search_debounce_ms = parse_number(key, value)?,
            "request_timeout" => {
                self.request_timeout = if value.is_empty() {
                    None
                } else {
                    Some(parse_number(key, value)?)
                };
            }
            "export_dir" => {
                self.export_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> AdminError {
    AdminError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}, endpoints.<entity>.<{}>",
        CONFIG_KEYS.join(", "),
        ENDPOINT_OPS.join("|")
    ))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AdminError::Config(format!("invalid value for {key}: '{value}'")))
}

/// `endpoints.<entity>.<op>` split into its parts; `None` for other keys.
fn parse_endpoint_key(key: &str) -> Result<Option<(EntityKind, &str)>> {
    let Some(rest) = key.strip_prefix("endpoints.") else {
        return Ok(None);
    };
    let (entity, op) = rest.split_once('.').ok_or_else(|| unknown_key(key))?;
    let kind: EntityKind = entity.parse()?;
    let op = ENDPOINT_OPS
        .iter()
        .find(|candidate| **candidate == op)
        .copied()
        .ok_or_else(|| unknown_key(key))?;
    Ok(Some((kind, op)))
}

fn endpoint_slot<'a>(overrides: &'a EndpointOverrides, op: &str) -> &'a Option<String> {
    match op {
        "list" => &overrides.list,
        "create" => &overrides.create,
        "update" => &overrides.update,
        "status" => &overrides.status,
        _ => &overrides.delete,
    }
}

fn endpoint_slot_mut<'a>(overrides: &'a mut EndpointOverrides, op: &str) -> &'a mut Option<String> {
    match op {
        "list" => &mut overrides.list,
        "create" => &mut overrides.create,
        "update" => &mut overrides.update,
        "status" => &mut overrides.status,
        _ => &mut overrides.delete,
    }
}
