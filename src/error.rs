use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    // Remote errors
    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("not logged in. Run: ownifie login --email <email>")]
    NotAuthenticated,

    // Client-side errors, detected before any request is sent
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{entity} does not support {operation}")]
    Unsupported {
        entity: String,
        operation: &'static str,
    },

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("no records selected")]
    EmptySelection,

    #[error("record '{0}' not found")]
    RecordNotFound(String),

    #[error("invalid status '{0}', expected one of: active, deactive, pending")]
    InvalidStatus(String),

    #[error("unknown entity '{0}', expected one of: project, blog, booking, contact, partner")]
    InvalidEntity(String),

    #[error("invalid sort direction '{0}', expected 'ascending' or 'descending'")]
    InvalidSortDirection(String),

    #[error("invalid bulk action '{0}', expected 'activate', 'deactivate' or 'delete'")]
    InvalidBulkAction(String),

    #[error("invalid page size {0}, must be at least 1")]
    InvalidPageSize(usize),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl AdminError {
    /// The request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, AdminError::Network(_))
            || matches!(self, AdminError::Http(e) if e.status().is_none())
    }

    /// The server answered with a non-success status.
    pub fn is_server(&self) -> bool {
        matches!(self, AdminError::Server { .. })
            || matches!(self, AdminError::Http(e) if e.status().is_some())
    }

    /// Rejected locally before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AdminError::Validation(_)
                | AdminError::InvalidStatus(_)
                | AdminError::InvalidPageSize(_)
                | AdminError::EmptySelection
                | AdminError::Unsupported { .. }
        )
    }

    pub fn invalid_status(s: String) -> Self {
        AdminError::InvalidStatus(s)
    }

    pub fn invalid_entity(s: String) -> Self {
        AdminError::InvalidEntity(s)
    }

    pub fn invalid_sort_direction(s: String) -> Self {
        AdminError::InvalidSortDirection(s)
    }

    pub fn invalid_bulk_action(s: String) -> Self {
        AdminError::InvalidBulkAction(s)
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
