//! Admin login request.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::utils::validation::validate_login;

use super::error::ApiError;
use super::http::{build_http_client, join_url, normalize_base_url};

/// Default login endpoint.
pub const LOGIN_PATH: &str = "/api/adminLogin";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful login response.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("message", &self.message)
            .finish()
    }
}

/// Unauthenticated client used to obtain a session token.
pub struct AuthClient {
    client: Client,
    base_url: String,
    login_path: String,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: normalize_base_url(base_url)?,
            login_path: LOGIN_PATH.to_string(),
        })
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Validate credentials locally, then exchange them for a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        validate_login(email, password)?;

        let url = join_url(&self.base_url, &self.login_path);
        tracing::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                email: email.trim(),
                password,
            })
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::from_response_body(status, &text).into());
        }

        let login: LoginResponse = serde_json::from_str(&text)?;
        if login.token.trim().is_empty() {
            return Err(AdminError::Server {
                status: status.as_u16(),
                message: "login response did not include a token".to_string(),
            });
        }
        tracing::info!("logged in as {}", email.trim());
        Ok(login)
    }
}
