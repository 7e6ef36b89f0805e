//! Filter/sort/paginate pipeline for record lists.
//!
//! Filters are composed with a builder and applied in a fixed order:
//! search, status, category, then a stable sort, then the page slice.

use std::collections::BTreeSet;

use crate::entity::EntityProfile;
use crate::error::{AdminError, Result};
use crate::types::{Record, RecordId, RecordStatus};

pub mod pagination;
pub mod sort;

pub use pagination::{PageItem, clamp_page, page_bounds, page_window, total_pages};
pub use sort::{SortDirection, SortSpec, compare_records, sort_records};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Client-local view parameters for one list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    /// `None` means "all".
    pub status: Option<RecordStatus>,
    /// `None` means "all".
    pub category: Option<String>,
    pub sort: Option<SortSpec>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub selection: BTreeSet<RecordId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            category: None,
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            selection: BTreeSet::new(),
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(AdminError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page_size,
            ..Default::default()
        })
    }

    /// True when any search or filter narrows the collection.
    pub fn is_filtered(&self) -> bool {
        !self.search.trim().is_empty() || self.status.is_some() || self.category.is_some()
    }
}

/// Parse a filter argument where `all` (or empty) means no filter.
pub fn parse_filter_arg(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a status filter argument (`all` or a status name).
pub fn parse_status_filter(value: &str) -> Result<Option<RecordStatus>> {
    parse_filter_arg(value).map(|s| s.parse()).transpose()
}

/// Trait for record filters
pub trait RecordFilter: Send + Sync {
    fn matches(&self, record: &Record) -> bool;
}

/// Case-insensitive substring match over a set of fields.
pub struct SearchFilter {
    needle: String,
    fields: Vec<String>,
}

impl SearchFilter {
    pub fn new(term: &str, fields: &[String]) -> Self {
        Self {
            needle: term.trim().to_lowercase(),
            fields: fields.to_vec(),
        }
    }
}

impl RecordFilter for SearchFilter {
    fn matches(&self, record: &Record) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        self.fields.iter().any(|field| {
            record
                .field_text(field)
                .is_some_and(|text| text.to_lowercase().contains(&self.needle))
        })
    }
}

/// Exact match on record status.
pub struct StatusFilter {
    target: RecordStatus,
}

impl StatusFilter {
    pub fn new(status: RecordStatus) -> Self {
        Self { target: status }
    }
}

impl RecordFilter for StatusFilter {
    fn matches(&self, record: &Record) -> bool {
        record.status == Some(self.target)
    }
}

/// Exact match on an entity-specific category field (e.g. project type).
pub struct CategoryFilter {
    field: String,
    value: String,
}

impl CategoryFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl RecordFilter for CategoryFilter {
    fn matches(&self, record: &Record) -> bool {
        record.field_text(&self.field).as_deref() == Some(self.value.as_str())
    }
}

/// A built query: filters plus optional sort.
pub struct RecordQuery {
    filters: Vec<Box<dyn RecordFilter>>,
    sort: Option<SortSpec>,
}

impl RecordQuery {
    /// Build the query for a view of one entity.
    ///
    /// A category filter on an entity without a category field matches nothing.
    pub fn for_view(view: &ViewState, profile: &EntityProfile) -> Self {
        let mut builder = RecordQueryBuilder::new();
        if !view.search.trim().is_empty() {
            builder = builder.with_filter(Box::new(SearchFilter::new(
                &view.search,
                &profile.search_fields,
            )));
        }
        if let Some(status) = view.status {
            builder = builder.with_filter(Box::new(StatusFilter::new(status)));
        }
        if let Some(category) = &view.category {
            builder = match &profile.category_field {
                Some(field) => {
                    builder.with_filter(Box::new(CategoryFilter::new(field, category.as_str())))
                }
                None => builder.with_filter(Box::new(NothingFilter)),
            };
        }
        if let Some(sort) = &view.sort {
            builder = builder.with_sort(sort.clone());
        }
        builder.build()
    }

    /// Filter then sort, preserving collection order among ties.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        let mut filtered: Vec<&Record> = records
            .iter()
            .filter(|r| self.filters.iter().all(|f| f.matches(r)))
            .collect();

        if let Some(spec) = &self.sort {
            sort::sort_records(&mut filtered, spec);
        }

        filtered
    }
}

struct NothingFilter;

impl RecordFilter for NothingFilter {
    fn matches(&self, _record: &Record) -> bool {
        false
    }
}

/// Query builder for filtering and sorting records
#[derive(Default)]
pub struct RecordQueryBuilder {
    filters: Vec<Box<dyn RecordFilter>>,
    sort: Option<SortSpec>,
}

impl RecordQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter (AND composition)
    pub fn with_filter(mut self, filter: Box<dyn RecordFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn build(self) -> RecordQuery {
        RecordQuery {
            filters: self.filters,
            sort: self.sort,
        }
    }
}

/// One rendered page plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub records: Vec<&'a Record>,
    /// Page actually shown, after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Number of records matching the filters.
    pub total_count: usize,
    /// Zero-based start index of the page within the filtered list.
    pub start: usize,
}

impl PageView<'_> {
    /// "Showing a to b of n" bounds, 1-based; `(0, 0)` when empty.
    pub fn showing(&self) -> (usize, usize) {
        if self.records.is_empty() {
            (0, 0)
        } else {
            (self.start + 1, self.start + self.records.len())
        }
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

/// Filtered and sorted view of the whole collection (no page slice).
pub fn filtered<'a>(
    collection: &'a [Record],
    view: &ViewState,
    profile: &EntityProfile,
) -> Vec<&'a Record> {
    RecordQuery::for_view(view, profile).apply(collection)
}

/// Run the full pipeline and slice out the requested page.
pub fn apply<'a>(
    collection: &'a [Record],
    view: &ViewState,
    profile: &EntityProfile,
) -> PageView<'a> {
    paginate(filtered(collection, view, profile), view.page, view.page_size)
}

/// Slice an already filtered list; an out-of-range page is clamped.
pub fn paginate(records: Vec<&Record>, page: usize, page_size: usize) -> PageView<'_> {
    let total_count = records.len();
    let page = clamp_page(page, total_count, page_size);
    let (start, end) = page_bounds(page, total_count, page_size);
    PageView {
        records: records[start..end].to_vec(),
        page,
        total_pages: total_pages(total_count, page_size),
        total_count,
        start,
    }
}
