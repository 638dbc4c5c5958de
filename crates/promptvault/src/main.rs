use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use promptvault_db::Database;

mod categories;
mod config;
mod logging;
mod prompts;
mod stats;
mod transfer;

use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "promptvault",
    about = "Personal library for AI prompts",
    version,
    author
)]
struct Cli {
    /// Path to the database file (default: ./prompts.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new prompt
    Add {
        /// Prompt title
        #[arg(short, long)]
        title: String,

        /// Optional description of what the prompt does
        #[arg(short, long)]
        description: Option<String>,

        /// The prompt text itself
        #[arg(short, long)]
        content: String,

        /// Category name
        #[arg(long, default_value = "General")]
        category: String,

        /// Comma-separated tags (tag1, tag2, tag3)
        #[arg(long)]
        tags: Option<String>,
    },

    /// List prompts
    List {
        /// Filter by category ("All" disables the filter)
        #[arg(long)]
        category: Option<String>,

        /// Substring search over title, description, and content
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single prompt in full
    Show {
        /// Prompt id
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields of an existing prompt
    Update {
        /// Prompt id
        id: i64,

        /// New title (empty means no change)
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New content
        #[arg(short, long)]
        content: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a prompt
    Delete {
        /// Prompt id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List categories with prompt counts
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show library statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export all prompts to a JSON file
    Export {
        /// Output file (default: prompts_export_<timestamp>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import prompts from a JSON file
    Import {
        /// JSON file to import
        file: PathBuf,

        /// Parse and report the record count without inserting
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing("warn");

    let db = open_database(cli.db)?;

    match cli.command {
        Command::Add {
            title,
            description,
            content,
            category,
            tags,
        } => prompts::handle_add(&db, title, description, content, category, tags),
        Command::List {
            category,
            search,
            json,
        } => prompts::handle_list(&db, category, search, json),
        Command::Show { id, json } => prompts::handle_show(&db, id, json),
        Command::Update {
            id,
            title,
            description,
            content,
            category,
            tags,
        } => prompts::handle_update(&db, id, title, description, content, category, tags),
        Command::Delete { id, yes } => prompts::handle_delete(&db, id, yes),
        Command::Categories { json } => categories::handle_categories(&db, json),
        Command::Stats { json } => stats::handle_stats(&db, json),
        Command::Export { out } => transfer::handle_export(&db, out),
        Command::Import { file, dry_run } => transfer::handle_import(&db, file, dry_run),
    }
}

/// Resolve the database path (flag > config file > default) and open it.
///
/// Schema initialization failure is fatal here; no operation can proceed
/// without the schema.
fn open_database(flag_path: Option<PathBuf>) -> Result<Database> {
    let path = match flag_path {
        Some(path) => Some(path),
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            ProjectConfig::load(&working_dir)?.and_then(|c| c.database.path)
        }
    };

    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "opening database");
            Database::open_at(&path).context("Failed to initialize database")
        }
        None => Database::open().context("Failed to initialize database"),
    }
}
