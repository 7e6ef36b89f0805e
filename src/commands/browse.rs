//! Line-driven browser for one entity.
//!
//! Reads one command per line from stdin and re-renders the page after each
//! one. Search terms typed with `/` are debounced: a burst of searches only
//! filters once input has been quiet for the configured delay.

use std::io::Write;
use std::sync::Arc;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::interactive::is_yes;
use super::open_store;
use crate::config::Config;
use crate::display::render_page;
use crate::entity::EntityKind;
use crate::error::{AdminError, Result};
use crate::list::{AlwaysDecline, AssumeYes, BulkAction, ConfirmGate, ListStore, LoadState};
use crate::notify::{ConsoleNotifier, Notice};
use crate::query::{parse_filter_arg, parse_status_filter};
use crate::remote::CollectionClient;
use crate::types::RecordId;

const HELP: &str = "\
Commands:
  /TEXT, s TEXT   search (empty clears)
  n, p            next / previous page
  g N             go to page N
  size N          rows per page
  o KEY           sort by KEY, again to flip direction
  f STATUS        status filter (all, active, deactive, pending)
  c CATEGORY      category filter (all to clear)
  x N             select or unselect row N
  a, u            select all on page / clear selection
  b ACTION        bulk activate, deactivate or delete on the selection
  t N             toggle status of row N
  d N             delete row N
  r               refresh
  ?               this help
  q               quit";

/// One browser command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseAction {
    // View
    Search(String),
    NextPage,
    PrevPage,
    GoToPage(usize),
    PageSize(usize),
    Sort(String),
    StatusFilter(String),
    CategoryFilter(String),

    // Selection
    ToggleRow(usize),
    SelectAll,
    ClearSelection,

    // Mutations
    Bulk(BulkAction),
    ToggleStatus(usize),
    Delete(usize),
    Refresh,

    Help,
    Quit,
}

/// Parse one input line. Rows are 1-based positions on the current page.
pub fn parse_browse_action(line: &str) -> std::result::Result<BrowseAction, String> {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Ok(BrowseAction::Search(term.trim().to_string()));
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    let action = match command {
        "s" => BrowseAction::Search(arg.to_string()),
        "n" => BrowseAction::NextPage,
        "p" => BrowseAction::PrevPage,
        "g" => BrowseAction::GoToPage(parse_number(command, arg)?),
        "size" => BrowseAction::PageSize(parse_number(command, arg)?),
        "o" => BrowseAction::Sort(required(command, arg)?),
        "f" => BrowseAction::StatusFilter(required(command, arg)?),
        "c" => BrowseAction::CategoryFilter(required(command, arg)?),
        "x" => BrowseAction::ToggleRow(parse_number(command, arg)?),
        "a" => BrowseAction::SelectAll,
        "u" => BrowseAction::ClearSelection,
        "b" => BrowseAction::Bulk(
            required(command, arg)?
                .parse()
                .map_err(|e: AdminError| e.to_string())?,
        ),
        "t" => BrowseAction::ToggleStatus(parse_number(command, arg)?),
        "d" => BrowseAction::Delete(parse_number(command, arg)?),
        "r" => BrowseAction::Refresh,
        "?" | "h" | "help" => BrowseAction::Help,
        "q" | "quit" | "exit" => BrowseAction::Quit,
        "" => return Err("empty command, type ? for help".to_string()),
        other => return Err(format!("unknown command '{other}', type ? for help")),
    };
    Ok(action)
}

fn required(command: &str, arg: &str) -> std::result::Result<String, String> {
    if arg.is_empty() {
        Err(format!("'{command}' needs an argument"))
    } else {
        Ok(arg.to_string())
    }
}

fn parse_number(command: &str, arg: &str) -> std::result::Result<usize, String> {
    arg.parse()
        .map_err(|_| format!("'{command}' needs a number, got '{arg}'"))
}

/// Browse an entity interactively
pub async fn cmd_browse(entity: EntityKind) -> Result<()> {
    let config = Config::load()?;
    let mut store = open_store(&config, entity, Arc::new(ConsoleNotifier::default()))?;
    // A failed first load is already reported; `r` retries.
    let _ = store.refresh().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render_view(&store));
    println!("{}", "Type ? for help, q to quit.".dimmed());

    loop {
        prompt()?;
        let deadline = store.search_deadline();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = wait_until(deadline) => {
                if store.poll_search(std::time::Instant::now()) {
                    println!();
                    println!("{}", render_view(&store));
                }
                continue;
            }
        };

        // EOF ends the session like `q`
        let Some(line) = line else {
            break;
        };

        let action = match parse_browse_action(&line) {
            Ok(action) => action,
            Err(message) => {
                eprintln!("{}", Notice::error(message).render());
                continue;
            }
        };

        match run_action(&mut store, action, &mut lines).await? {
            Flow::Continue => println!("{}", render_view(&store)),
            Flow::Quiet => {}
            Flow::Quit => break,
        }
    }
    Ok(())
}

enum Flow {
    Continue,
    /// Nothing visible changed yet.
    Quiet,
    Quit,
}

async fn run_action<C: CollectionClient>(
    store: &mut ListStore<C>,
    action: BrowseAction,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Flow> {
    match action {
        BrowseAction::Search(term) => {
            store.queue_search(term, std::time::Instant::now());
            return Ok(Flow::Quiet);
        }
        BrowseAction::NextPage => store.next_page(),
        BrowseAction::PrevPage => store.prev_page(),
        BrowseAction::GoToPage(page) => store.set_page(page),
        BrowseAction::PageSize(size) => report(store.set_page_size(size)),
        BrowseAction::Sort(key) => store.toggle_sort(&key),
        BrowseAction::StatusFilter(value) => match parse_status_filter(&value) {
            Ok(status) => store.set_status_filter(status),
            Err(e) => report(Err(e)),
        },
        BrowseAction::CategoryFilter(value) => store.set_category_filter(parse_filter_arg(&value)),
        BrowseAction::ToggleRow(row) => {
            if let Some(id) = row_id(store, row) {
                report(store.toggle_selected(&id).map(|_| ()));
            }
        }
        BrowseAction::SelectAll => store.select_all_on_page(),
        BrowseAction::ClearSelection => store.clear_selection(),
        BrowseAction::Bulk(action) => {
            let selected = store.selected_ids().len();
            let confirmed = selected > 0
                && (!action.is_destructive()
                    || ask(lines, &format!("{action} {selected} selected records")).await?);
            let gate: &dyn ConfirmGate = if confirmed { &AssumeYes } else { &AlwaysDecline };
            // Outcome and errors are reported by the store
            let _ = store.run_bulk(action, gate).await;
        }
        BrowseAction::ToggleStatus(row) => {
            if let Some(id) = row_id(store, row) {
                // Request failures are reported by the store
                if let Err(e @ AdminError::Unsupported { .. }) = store.toggle_status(&id).await {
                    report(Err(e));
                }
            }
        }
        BrowseAction::Delete(row) => {
            if let Some(id) = row_id(store, row) {
                let confirmed = ask(lines, &format!("delete {} {id}", store.profile().kind)).await?;
                let gate: &dyn ConfirmGate = if confirmed { &AssumeYes } else { &AlwaysDecline };
                if let Err(e @ AdminError::Cancelled(_)) = store.delete(&id, gate).await {
                    eprintln!("{}", Notice::info(e.to_string()).render());
                }
            }
        }
        BrowseAction::Refresh => {
            let _ = store.refresh().await;
        }
        BrowseAction::Help => {
            println!("{HELP}");
            return Ok(Flow::Quiet);
        }
        BrowseAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Id of the 1-based `row` on the current page, reporting when it is absent.
fn row_id<C: CollectionClient>(store: &ListStore<C>, row: usize) -> Option<RecordId> {
    let id = row
        .checked_sub(1)
        .and_then(|i| store.current_page().records.get(i).map(|r| r.id.clone()));
    if id.is_none() {
        eprintln!("{}", Notice::error(format!("no row {row} on this page")).render());
    }
    id
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        eprintln!("{}", Notice::error(e.to_string()).render());
    }
}

/// Ask a yes/no question on the browser's own input stream.
async fn ask(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<bool> {
    print!("{question}? [y/N] ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.is_some_and(|answer| is_yes(&answer)))
}

fn prompt() -> Result<()> {
    print!("{} ", ">".cyan());
    std::io::stdout().flush()?;
    Ok(())
}

async fn wait_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Page table plus a one-line summary of the active view.
fn render_view<C: CollectionClient>(store: &ListStore<C>) -> String {
    let view = store.view();
    let mut state = Vec::new();
    if !view.search.is_empty() {
        state.push(format!("search \"{}\"", view.search));
    }
    if let Some(status) = view.status {
        state.push(format!("status {status}"));
    }
    if let Some(category) = &view.category {
        state.push(format!("category {category}"));
    }
    if let Some(sort) = &view.sort {
        state.push(format!("sorted by {} {}", sort.key, sort.direction));
    }
    if !view.selection.is_empty() {
        state.push(format!("{} selected", view.selection.len()));
    }
    if let LoadState::Error(message) = store.load_state() {
        state.push(format!("last load failed: {message}").red().to_string());
    }

    let mut out = format!("{}", store.profile().kind.collection().cyan().bold());
    if !state.is_empty() {
        out.push_str(&format!("  {}", state.join(", ")));
    }
    out.push('\n');
    out.push_str(&render_page(
        &store.current_page(),
        store.profile(),
        Some(&view.selection),
    ));
    out
}
