use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;

use crate::entity::EntityKind;
use crate::list::BulkAction;
use crate::types::RecordStatus;

const VALID_ENTITIES: &[&str] = &["project", "blog", "booking", "contact", "partner"];
const VALID_STATUSES: &[&str] = &["active", "deactive", "pending"];
const VALID_BULK_ACTIONS: &[&str] = &["activate", "deactivate", "delete"];

#[derive(Parser)]
#[command(name = "ownifie")]
#[command(about = "Back-office administration for the Ownifie real-estate API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options shared by commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Search, filter, sort and paging options for a list view
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Case-insensitive search over the entity's search fields
    #[arg(short, long)]
    pub search: Option<String>,

    /// Status filter: all, active, deactive, pending
    #[arg(long, default_value = "all")]
    pub status: String,

    /// Category filter (project type, partner category, ...) or "all"
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Field to sort by (dotted paths allowed, e.g. user.fullname)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page number (1-based; out-of-range pages are clamped)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Records per page (default: from config)
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in as an administrator and store the session token
    Login {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// List one page of records
    #[command(visible_alias = "ls")]
    List {
        /// Entity: project, blog, booking, contact, partner
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show one record
    Show {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Record id
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Create a record (projects and blogs)
    Create {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Field as key=value; repeatable. Values are parsed as JSON when possible
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Update fields of a record (projects and blogs)
    Update {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        id: String,

        /// Field as key=value; repeatable
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Set the status of a record
    Status {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        id: String,

        /// New status: active, deactive, pending
        #[arg(value_parser = parse_status)]
        status: RecordStatus,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Flip a record between active and deactive
    Toggle {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Delete a record
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Apply an action to several records, one request at a time
    Bulk {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Action: activate, deactivate, delete
        #[arg(value_parser = parse_bulk_action)]
        action: BulkAction,

        /// Ids to act on; each must be on the selected page
        #[arg(conflicts_with = "all_on_page")]
        ids: Vec<String>,

        /// Select every record on the selected page
        #[arg(long)]
        all_on_page: bool,

        #[command(flatten)]
        view: ViewArgs,

        /// Skip the confirmation prompt for deletes
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Export the filtered and sorted view to CSV
    Export {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        #[command(flatten)]
        view: ViewArgs,

        /// Output file (default: <export_dir>/<entity>_export_<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Dashboard summary counts across all entities
    Stats {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Browse an entity interactively
    Browse {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Get one configuration value
    Get {
        /// Key, e.g. base_url, page_size, endpoints.project.list
        key: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Set one configuration value (empty value unsets optional keys)
    Set {
        key: String,
        value: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            cmd_browse, cmd_bulk, cmd_config_get, cmd_config_set, cmd_config_show, cmd_create,
            cmd_delete, cmd_export, cmd_list, cmd_login, cmd_logout, cmd_show, cmd_stats,
            cmd_status, cmd_toggle, cmd_update,
        };

        match self {
            Commands::Login { email, password } => cmd_login(&email, password).await,
            Commands::Logout => cmd_logout(),
            Commands::List {
                entity,
                view,
                output,
            } => cmd_list(entity, &view, output).await,
            Commands::Show { entity, id, output } => cmd_show(entity, &id, output).await,
            Commands::Create {
                entity,
                fields,
                output,
            } => cmd_create(entity, &fields, output).await,
            Commands::Update {
                entity,
                id,
                fields,
                output,
            } => cmd_update(entity, &id, &fields, output).await,
            Commands::Status {
                entity,
                id,
                status,
                output,
            } => cmd_status(entity, &id, status, output).await,
            Commands::Toggle { entity, id, output } => cmd_toggle(entity, &id, output).await,
            Commands::Delete {
                entity,
                id,
                yes,
                output,
            } => cmd_delete(entity, &id, yes, output).await,
            Commands::Bulk {
                entity,
                action,
                ids,
                all_on_page,
                view,
                yes,
                output,
            } => cmd_bulk(entity, action, &ids, all_on_page, &view, yes, output).await,
            Commands::Export {
                entity,
                view,
                output,
            } => cmd_export(entity, &view, output).await,
            Commands::Stats { output } => cmd_stats(output).await,
            Commands::Browse { entity } => cmd_browse(entity).await,
            Commands::Config { action } => match action {
                ConfigAction::Show { output } => cmd_config_show(output),
                ConfigAction::Get { key, output } => cmd_config_get(&key, output),
                ConfigAction::Set { key, value, output } => cmd_config_set(&key, &value, output),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_entity(s: &str) -> Result<EntityKind, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "entity",
        VALID_ENTITIES,
    )
}

fn parse_status(s: &str) -> Result<RecordStatus, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "status",
        VALID_STATUSES,
    )
}

fn parse_bulk_action(s: &str) -> Result<BulkAction, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "action",
        VALID_BULK_ACTIONS,
    )
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "ownifie", &mut io::stdout());
}
