//! Terminal rendering for list pages, single records and stats.

use std::collections::BTreeSet;

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::entity::{Column, EntityProfile};
use crate::query::{PageItem, PageView, page_window};
use crate::stats::CollectionStats;
use crate::types::{Record, RecordId, RecordStatus};
use crate::utils::truncate_string;

/// Widest a table cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 40;

/// Pages shown either side of the current one in the page window.
const PAGE_WINDOW_RADIUS: usize = 1;

pub fn format_status_colored(status: Option<RecordStatus>) -> String {
    match status {
        Some(RecordStatus::Active) => "active".green().to_string(),
        Some(RecordStatus::Deactive) => "deactive".red().to_string(),
        Some(RecordStatus::Pending) => "pending".yellow().to_string(),
        None => "-".dimmed().to_string(),
    }
}

/// Table of records through a column projection.
///
/// With a selection, a leading marker column shows which rows are selected.
pub fn render_table(
    records: &[&Record],
    columns: &[Column],
    selection: Option<&BTreeSet<RecordId>>,
) -> String {
    let mut builder = Builder::default();

    let mut header = Vec::with_capacity(columns.len() + 2);
    if selection.is_some() {
        header.push(String::new());
    }
    header.push("ID".to_string());
    header.extend(columns.iter().map(|c| c.header.clone()));
    builder.push_record(header);

    for record in records {
        let mut row = Vec::with_capacity(columns.len() + 2);
        if let Some(selection) = selection {
            row.push(if selection.contains(&record.id) { "[x]" } else { "[ ]" }.to_string());
        }
        row.push(record.id.to_string());
        row.extend(
            columns
                .iter()
                .map(|c| truncate_string(&c.value(record).replace('\n', " "), MAX_CELL_WIDTH)),
        );
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// `Showing a to b of n entries`.
pub fn format_footer(page: &PageView<'_>) -> String {
    let (from, to) = page.showing();
    format!("Showing {from} to {to} of {} entries", page.total_count)
}

/// Page buttons, current page in brackets: `1 … 4 [5] 6 … 12`.
pub fn format_page_window(page: &PageView<'_>) -> String {
    page_window(page.page, page.total_pages, PAGE_WINDOW_RADIUS)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == page.page => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full page rendering: table, footer and page window.
pub fn render_page(
    page: &PageView<'_>,
    profile: &EntityProfile,
    selection: Option<&BTreeSet<RecordId>>,
) -> String {
    let mut out = String::new();
    if page.records.is_empty() {
        out.push_str(&format!("No {} found.\n", profile.kind.collection()));
    } else {
        out.push_str(&render_table(&page.records, &profile.columns, selection));
        out.push('\n');
    }
    out.push_str(&format!(
        "{}   {}",
        format_footer(page).dimmed(),
        format_page_window(page)
    ));
    out
}

/// One record: projected columns, then every raw field.
pub fn render_record(record: &Record, profile: &EntityProfile) -> String {
    let mut out = format!("{} {}\n", profile.kind.to_string().cyan().bold(), record.id);
    if profile.supports_status {
        out.push_str(&format!("  {:<14} {}\n", "Status", format_status_colored(record.status)));
    }
    for column in &profile.columns {
        if column.header == "Status" {
            continue;
        }
        out.push_str(&format!("  {:<14} {}\n", column.header, column.value(record)));
    }
    out.push_str(&format!("\n{}\n", "Fields:".dimmed()));
    match serde_json::to_string_pretty(&record.to_json()) {
        Ok(json) => out.push_str(&json),
        Err(_) => out.push_str("{}"),
    }
    out
}

/// Stats block for one entity.
pub fn render_stats(title: &str, stats: &CollectionStats) -> String {
    let mut out = format!("{} {}\n", title.cyan().bold(), stats.total);
    for (status, count) in &stats.by_status {
        out.push_str(&format!("  {status:<12} {count}\n"));
    }
    if stats.without_status > 0 {
        out.push_str(&format!("  {:<12} {}\n", "unknown", stats.without_status));
    }
    for (category, count) in &stats.by_category {
        out.push_str(&format!("  {category:<12} {count}\n"));
    }
    out
}
