//! Admin session.
//!
//! A [`Session`] is created empty, hydrated from the persisted token at
//! start-up, and moved between states only through [`Session::login`] and
//! [`Session::logout`]. Commands that talk to the API receive the session
//! explicitly and ask it for the bearer token.
//!
//! # Security Note
//!
//! The token is held in a `SecretBox` and never appears in `Debug` output
//! or logs. `session.yaml` is written with owner-only permissions on Unix.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};

use crate::config::admin_root;
use crate::error::{AdminError, Result};
use crate::utils::{ensure_parent_dir, format_relative_path};

/// Environment variable that overrides the persisted token.
pub const TOKEN_ENV: &str = "OWNIFIE_TOKEN";

#[derive(Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

/// Persisted token location (`<root>/session.yaml`).
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the admin root directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(admin_root()?.join("session.yaml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            AdminError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read session at {}: {}",
                    format_relative_path(&self.path),
                    e
                ),
            ))
        })?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    fn save(&self, file: &SessionFile) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let content = serde_yaml_ng::to_string(file)?;
        fs::write(&self.path, content).map_err(|e| {
            AdminError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to write session at {}: {}",
                    format_relative_path(&self.path),
                    e
                ),
            ))
        })?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Authenticated-or-not state of the admin client.
#[derive(Default)]
pub struct Session {
    token: Option<SecretBox<String>>,
    user: Option<String>,
    store: Option<TokenStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    /// Unauthenticated session that persists nothing.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Restore the session from `store`. `OWNIFIE_TOKEN` takes precedence
    /// over the stored token.
    pub fn hydrate(store: TokenStore) -> Result<Self> {
        let file = store.load()?;
        let token = match env::var(TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Some(token),
            _ => file.token.filter(|t| !t.is_empty()),
        };
        tracing::debug!(authenticated = token.is_some(), "session hydrated");
        Ok(Self {
            token: token.map(|t| SecretBox::new(Box::new(t))),
            user: file.user,
            store: Some(store),
        })
    }

    /// Enter the authenticated state and persist the token.
    pub fn login(&mut self, token: String, user: Option<String>) -> Result<()> {
        if token.is_empty() {
            return Err(AdminError::Validation("login returned an empty token".to_string()));
        }
        if let Some(store) = &self.store {
            store.save(&SessionFile {
                token: Some(token.clone()),
                user: user.clone(),
            })?;
        }
        self.token = Some(SecretBox::new(Box::new(token)));
        self.user = user;
        tracing::info!(user = self.user.as_deref().unwrap_or("-"), "logged in");
        Ok(())
    }

    /// Leave the authenticated state and remove the persisted token.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        self.token = None;
        self.user = None;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Bearer token for API requests.
    pub fn require_token(&self) -> Result<SecretBox<String>> {
        self.token
            .as_ref()
            .map(|t| SecretBox::new(Box::new(t.expose_secret().clone())))
            .ok_or(AdminError::NotAuthenticated)
    }
}
