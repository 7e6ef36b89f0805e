//! reqwest-backed collection client.
//!
//! # Security Note - Logging
//!
//! The bearer token is held in a `SecretBox` and the `Authorization` header
//! value is marked sensitive, so it is redacted from reqwest/hyper debug
//! output. Request lines are logged at `debug` without headers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretBox};
use serde_json::{Value, json};
use url::Url;

use crate::entity::Endpoints;
use crate::error::{AdminError, Result};
use crate::types::{FieldMap, Record, RecordId, RecordStatus};

use super::error::ApiError;
use super::{CollectionClient, record_from_body, records_from_list};

/// Build the shared HTTP client. Without a timeout the transport default applies.
pub(crate) fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Validate a base URL and strip any trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| AdminError::Config(format!("invalid base_url '{base_url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AdminError::Config(format!(
            "invalid base_url '{base_url}': scheme must be http or https"
        )));
    }
    Ok(trimmed.to_string())
}

/// Join a base URL and an endpoint path.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// Collection client for one entity over HTTP with bearer authentication.
pub struct HttpCollectionClient {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
    token: Arc<SecretBox<String>>,
}

impl HttpCollectionClient {
    pub fn new(base_url: &str, endpoints: Endpoints, token: SecretBox<String>) -> Result<Self> {
        Self::with_timeout(base_url, endpoints, token, None)
    }

    pub fn with_timeout(
        base_url: &str,
        endpoints: Endpoints,
        token: SecretBox<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: normalize_base_url(base_url)?,
            endpoints,
            token: Arc::new(token),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn auth_header(&self) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret()))
                .map_err(|_| AdminError::Config("session token contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Send one request and decode the JSON body (`Null` for an empty body).
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = join_url(&self.base_url, path);
        tracing::debug!("{method} {url}");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::AUTHORIZATION, self.auth_header()?)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
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
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl CollectionClient for HttpCollectionClient {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let body = self.send(Method::GET, &self.endpoints.list, None).await?;
        let records = records_from_list(body)?;
        tracing::debug!("fetched {} records from {}", records.len(), self.endpoints.list);
        Ok(records)
    }

    async fn create(&self, fields: &FieldMap) -> Result<Record> {
        let body = Value::Object(fields.clone());
        let response = self
            .send(Method::POST, &self.endpoints.create, Some(&body))
            .await?;
        let record = record_from_body(response)?;
        tracing::info!("created record {}", record.id);
        Ok(record)
    }

    async fn update(&self, id: &RecordId, fields: &FieldMap) -> Result<Record> {
        let path = Endpoints::expand(&self.endpoints.update, id.as_str());
        let body = Value::Object(fields.clone());
        let response = self.send(Method::PUT, &path, Some(&body)).await?;
        tracing::info!("updated record {id}");
        // Some endpoints answer with a bare acknowledgement; fall back to the
        // submitted fields so callers still get a record to display.
        match record_from_body(response) {
            Ok(record) => Ok(record),
            Err(_) => {
                let mut fields = fields.clone();
                fields.insert("id".to_string(), Value::String(id.to_string()));
                Record::from_json(Value::Object(fields))
            }
        }
    }

    async fn set_status(&self, id: &RecordId, status: RecordStatus) -> Result<()> {
        let path = Endpoints::expand(&self.endpoints.status, id.as_str());
        let body = json!({ "status": status });
        self.send(Method::PUT, &path, Some(&body)).await?;
        tracing::info!("set status of {id} to {status}");
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let path = Endpoints::expand(&self.endpoints.delete, id.as_str());
        self.send(Method::DELETE, &path, None).await?;
        tracing::info!("deleted record {id}");
        Ok(())
    }
}
