//! Entity profiles.
//!
//! Every admin screen runs the same list-management core; what differs per
//! entity (search fields, category filter, endpoints, export columns,
//! supported mutations) lives in an [`EntityProfile`] built here.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AdminError;
use crate::types::Record;

/// The entity types managed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Blog,
    Booking,
    Contact,
    Partner,
}

enum_display_fromstr!(
    EntityKind,
    AdminError::invalid_entity,
    {
        Project => "project" | "projects",
        Blog => "blog" | "blogs",
        Booking => "booking" | "bookings",
        Contact => "contact" | "contacts",
        Partner => "partner" | "partners",
    }
);

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Project,
        EntityKind::Blog,
        EntityKind::Booking,
        EntityKind::Contact,
        EntityKind::Partner,
    ];

    /// Plural collection name used in default endpoints and file names.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Blog => "blogs",
            EntityKind::Booking => "bookings",
            EntityKind::Contact => "contacts",
            EntityKind::Partner => "partners",
        }
    }

    /// Built-in profile for this entity.
    pub fn profile(self) -> EntityProfile {
        match self {
            EntityKind::Project => EntityProfile::builder(self)
                .search_fields(["projectName", "projectAddress"])
                .category_field("type")
                .with_status()
                .editable(["projectName", "projectAddress"])
                .column(Column::field("Name", "projectName"))
                .column(Column::field("Address", "projectAddress"))
                .column(Column::field("Type", "type"))
                .column(Column::field("Status", "status"))
                .column(Column::date("Date", "date"))
                .build(),
            EntityKind::Blog => EntityProfile::builder(self)
                .search_fields(["title", "content"])
                .with_status()
                .editable(["title", "content", "thumbnail"])
                .column(Column::field("Title", "title"))
                .column(Column::field("Author", "author"))
                .column(Column::field("Status", "status"))
                .column(Column::date("Date", "date"))
                .build(),
            EntityKind::Booking => EntityProfile::builder(self)
                .search_fields(["user.fullname", "user.email", "user.phone", "projectName"])
                .category_field("projectType")
                .column(Column::field("Full Name", "user.fullname"))
                .column(Column::field("Email", "user.email"))
                .column(Column::field("Phone", "user.phone"))
                .column(Column::field("City", "user.city"))
                .column(Column::field("State", "user.state"))
                .column(Column::field("Zip Code", "user.zipCode"))
                .column(Column::field("Project Name", "projectName"))
                .column(Column::field("Project Type", "projectType"))
                .build(),
            EntityKind::Contact => EntityProfile::builder(self)
                .search_fields(["fullName", "email", "phoneNumber", "projectId.projectName"])
                .column(Column::field("Full Name", "fullName"))
                .column(Column::field("Email", "email"))
                .column(Column::field("Phone", "phoneNumber"))
                .column(Column::field("Message", "message"))
                .column(Column::field_or("Project", "projectId.projectName", "Other Query"))
                .build(),
            EntityKind::Partner => EntityProfile::builder(self)
                .search_fields(["fullname", "email", "phone", "city", "partnerCategory"])
                .category_field("partnerCategory")
                .column(Column::field("Name", "fullname"))
                .column(Column::field("Email", "email"))
                .column(Column::field("Phone", "phone"))
                .column(Column::new("Location", |r| {
                    format!(
                        "{}, {} - {}",
                        r.field_text("city").unwrap_or_default(),
                        r.field_text("state").unwrap_or_default(),
                        r.field_text("zipCode").unwrap_or_default()
                    )
                }))
                .column(Column::field("Category", "partnerCategory"))
                .column(Column::date("Date", "createdAt"))
                .build(),
        }
    }
}

/// Endpoint templates for one collection. `{id}` is replaced by the record id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub list: String,
    pub create: String,
    pub update: String,
    pub status: String,
    pub delete: String,
}

impl Endpoints {
    /// REST-style defaults: `/api/<collection>[/{id}[/status]]`.
    pub fn rest(collection: &str) -> Self {
        let base = format!("/api/{collection}");
        Self {
            list: base.clone(),
            create: base.clone(),
            update: format!("{base}/{{id}}"),
            status: format!("{base}/{{id}}/status"),
            delete: format!("{base}/{{id}}"),
        }
    }

    /// Apply per-field overrides from configuration.
    pub fn with_overrides(mut self, overrides: &EndpointOverrides) -> Self {
        if let Some(list) = &overrides.list {
            self.list = list.clone();
        }
        if let Some(create) = &overrides.create {
            self.create = create.clone();
        }
        if let Some(update) = &overrides.update {
            self.update = update.clone();
        }
        if let Some(status) = &overrides.status {
            self.status = status.clone();
        }
        if let Some(delete) = &overrides.delete {
            self.delete = delete.clone();
        }
        self
    }

    /// Substitute a record id into a template as one percent-encoded path segment.
    pub fn expand(template: &str, id: &str) -> String {
        template.replace("{id}", &encode_path_segment(id))
    }
}

/// Percent-encode `segment` so `/`, `?` and `#` cannot leave the path segment.
fn encode_path_segment(segment: &str) -> String {
    // Dot segments would be resolved away by the URL parser
    if matches!(segment, "." | "..") {
        return segment.replace('.', "%2E");
    }
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Optional endpoint overrides as stored in `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
}

type Accessor = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// A projected column: header text plus an accessor producing the cell value.
#[derive(Clone)]
pub struct Column {
    pub header: String,
    accessor: Accessor,
}

impl Column {
    pub fn new(
        header: impl Into<String>,
        accessor: impl Fn(&Record) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            header: header.into(),
            accessor: Arc::new(accessor),
        }
    }

    /// Plain field value, empty when missing.
    pub fn field(header: impl Into<String>, path: &str) -> Self {
        let path = path.to_string();
        Self::new(header, move |r| r.field_text(&path).unwrap_or_default())
    }

    /// Field value with a fallback for missing values.
    pub fn field_or(header: impl Into<String>, path: &str, fallback: &str) -> Self {
        let path = path.to_string();
        let fallback = fallback.to_string();
        Self::new(header, move |r| {
            r.field_text(&path)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback.clone())
        })
    }

    /// Timestamp field shown as a calendar date (`N/A` when missing).
    pub fn date(header: impl Into<String>, path: &str) -> Self {
        let path = path.to_string();
        Self::new(header, move |r| match r.field_text(&path) {
            Some(raw) => format_date(&raw),
            None => "N/A".to_string(),
        })
    }

    pub fn value(&self, record: &Record) -> String {
        (self.accessor)(record)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// Render an ISO 8601 timestamp or date as `YYYY-MM-DD`; other text passes through.
pub fn format_date(raw: &str) -> String {
    if let Ok(ts) = raw.parse::<jiff::Timestamp>() {
        return ts.to_zoned(jiff::tz::TimeZone::UTC).date().to_string();
    }
    if let Ok(date) = raw.parse::<jiff::civil::Date>() {
        return date.to_string();
    }
    raw.to_string()
}

/// Everything the list-management core needs to know about one entity.
#[derive(Debug, Clone)]
pub struct EntityProfile {
    pub kind: EntityKind,
    pub search_fields: Vec<String>,
    pub category_field: Option<String>,
    pub supports_status: bool,
    pub supports_edit: bool,
    pub required_fields: Vec<String>,
    pub columns: Vec<Column>,
    pub endpoints: Endpoints,
}

impl EntityProfile {
    pub fn builder(kind: EntityKind) -> EntityProfileBuilder {
        EntityProfileBuilder::new(kind)
    }

    pub fn name(&self) -> String {
        self.kind.to_string()
    }

    /// Fail with `Unsupported` unless status changes are allowed.
    pub fn require_status(&self) -> crate::Result<()> {
        if self.supports_status {
            Ok(())
        } else {
            Err(AdminError::Unsupported {
                entity: self.name(),
                operation: "status changes",
            })
        }
    }

    /// Fail with `Unsupported` unless create/update are allowed.
    pub fn require_edit(&self) -> crate::Result<()> {
        if self.supports_edit {
            Ok(())
        } else {
            Err(AdminError::Unsupported {
                entity: self.name(),
                operation: "create or update",
            })
        }
    }
}

/// Builder for [`EntityProfile`].
pub struct EntityProfileBuilder {
    kind: EntityKind,
    search_fields: Vec<String>,
    category_field: Option<String>,
    supports_status: bool,
    supports_edit: bool,
    required_fields: Vec<String>,
    columns: Vec<Column>,
    endpoints: Option<Endpoints>,
}

impl EntityProfileBuilder {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            search_fields: Vec::new(),
            category_field: None,
            supports_status: false,
            supports_edit: false,
            required_fields: Vec::new(),
            columns: Vec::new(),
            endpoints: None,
        }
    }

    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn category_field(mut self, field: impl Into<String>) -> Self {
        self.category_field = Some(field.into());
        self
    }

    pub fn with_status(mut self) -> Self {
        self.supports_status = true;
        self
    }

    /// Allow create/update, requiring the given fields on create.
    pub fn editable<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supports_edit = true;
        self.required_fields = required.into_iter().map(Into::into).collect();
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn build(self) -> EntityProfile {
        let endpoints = self
            .endpoints
            .unwrap_or_else(|| Endpoints::rest(self.kind.collection()));
        EntityProfile {
            kind: self.kind,
            search_fields: self.search_fields,
            category_field: self.category_field,
            supports_status: self.supports_status,
            supports_edit: self.supports_edit,
            required_fields: self.required_fields,
            columns: self.columns,
            endpoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn test_entity_parse() {
        assert_eq!("projects".parse::<EntityKind>().unwrap(), EntityKind::Project);
        assert_eq!("Partner".parse::<EntityKind>().unwrap(), EntityKind::Partner);
        assert!("users".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::rest("projects");
        assert_eq!(endpoints.list, "/api/projects");
        assert_eq!(
            Endpoints::expand(&endpoints.status, "p1"),
            "/api/projects/p1/status"
        );
        assert_eq!(Endpoints::expand(&endpoints.delete, "p1"), "/api/projects/p1");
    }

    #[test]
    fn test_expand_encodes_id_segment() {
        let endpoints = Endpoints::rest("projects");
        assert_eq!(
            Endpoints::expand(&endpoints.status, "a/b?c#d"),
            "/api/projects/a%2Fb%3Fc%23d/status"
        );
        assert_eq!(
            Endpoints::expand(&endpoints.delete, "65f0c2e1-9 x"),
            "/api/projects/65f0c2e1-9%20x"
        );
        assert_eq!(Endpoints::expand(&endpoints.delete, ".."), "/api/projects/%2E%2E");
    }

    #[test]
    fn test_endpoint_overrides() {
        let overrides = EndpointOverrides {
            list: Some("/api/allProjects".to_string()),
            status: Some("/api/project/status-update/{id}".to_string()),
            ..Default::default()
        };
        let endpoints = Endpoints::rest("projects").with_overrides(&overrides);
        assert_eq!(endpoints.list, "/api/allProjects");
        assert_eq!(endpoints.create, "/api/projects");
        assert_eq!(
            Endpoints::expand(&endpoints.status, "9"),
            "/api/project/status-update/9"
        );
    }

    #[test]
    fn test_partner_location_column() {
        let profile = EntityKind::Partner.profile();
        let location = profile
            .columns
            .iter()
            .find(|c| c.header == "Location")
            .unwrap();
        let r = record(json!({
            "_id": "1", "city": "Pune", "state": "MH", "zipCode": "411001"
        }));
        assert_eq!(location.value(&r), "Pune, MH - 411001");
    }

    #[test]
    fn test_contact_project_fallback() {
        let profile = EntityKind::Contact.profile();
        let project = profile.columns.iter().find(|c| c.header == "Project").unwrap();
        assert_eq!(project.value(&record(json!({"_id": "1"}))), "Other Query");
        assert_eq!(
            project.value(&record(json!({"_id": "2", "projectId": {"projectName": "Palm"}}))),
            "Palm"
        );
    }

    #[test]
    fn test_date_column() {
        let column = Column::date("Date", "date");
        assert_eq!(
            column.value(&record(json!({"_id": "1", "date": "2024-03-05T10:00:00Z"}))),
            "2024-03-05"
        );
        assert_eq!(column.value(&record(json!({"_id": "1"}))), "N/A");
    }

    #[test]
    fn test_capabilities() {
        assert!(EntityKind::Project.profile().require_status().is_ok());
        assert!(EntityKind::Blog.profile().require_edit().is_ok());
        assert!(EntityKind::Contact.profile().require_status().is_err());
        assert!(EntityKind::Booking.profile().require_edit().is_err());
    }
}
