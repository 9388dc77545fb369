//! Command-line interface for tasksched
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in the submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::OutputOptions;
use crate::repository::TaskRepository;
use crate::storage::CsvStore;

mod init;
mod task;

/// tasksched - a CSV-backed task list
///
/// Tasks are ordered by priority, then by due date, and flagged when they
/// are overdue or due soon.
#[derive(Parser, Debug)]
#[command(name = "tasksched")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Task store CSV file (overrides the config file)
    #[arg(long, global = true, env = "TASKSCHED_FILE")]
    pub file: Option<PathBuf>,

    /// Config file (defaults to ./.tasksched.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the task store (and a default config) if missing
    Init,

    /// Add a task (priority Medium, status "In process")
    Add {
        /// Task title
        title: String,

        /// Due date: YYYY-MM-DD or dd/MM/yy (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Due time, 24-hour HH:mm (defaults to input.default_time)
        #[arg(long)]
        time: Option<String>,
    },

    /// List tasks by priority, then due date
    List {
        /// Classify urgency relative to this date instead of today
        #[arg(long, value_name = "YYYY-MM-DD")]
        today: Option<String>,
    },

    /// Show one task
    Show {
        /// Task ID
        id: u32,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: u32,
    },

    /// Set priority and/or status
    Set {
        /// Task ID
        id: u32,

        /// High, Medium or Low
        #[arg(long)]
        priority: Option<String>,

        /// "In process" or Finish
        #[arg(long)]
        status: Option<String>,
    },

    /// Replace title and due date (status goes back to "In process")
    Edit {
        /// Task ID
        id: u32,

        /// New title
        title: String,

        /// Due date: YYYY-MM-DD or dd/MM/yy
        #[arg(long)]
        date: String,

        /// Due time, 24-hour HH:mm
        #[arg(long)]
        time: String,
    },

    /// Write the ordered list to <dir>/ExportData.csv
    Export {
        /// Export directory (defaults to store.export_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Open the interactive task table
    Tui,
}

/// Resolved configuration and repository shared by commands
pub(crate) struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub repo: TaskRepository<CsvStore>,
}

impl Context {
    fn load(file: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let (config, config_path) = match config_path {
            Some(path) => (Config::load(&path)?, path),
            None => {
                let dir = std::env::current_dir()?;
                (Config::load_from_dir(&dir)?, dir.join(CONFIG_FILE))
            }
        };
        let store_path = file.unwrap_or_else(|| config.store.path.clone());
        tracing::debug!(path = %store_path.display(), "using task store");
        let repo = TaskRepository::new(CsvStore::new(store_path))
            .with_due_soon_days(config.urgency.due_soon_days);
        Ok(Self {
            config,
            config_path,
            repo,
        })
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = Context::load(self.file, self.config)?;

        match self.command {
            Commands::Init => init::run(&ctx, output),
            Commands::Add { title, date, time } => task::run_add(
                &ctx,
                task::AddOptions { title, date, time },
                output,
            ),
            Commands::List { today } => task::run_list(
                &ctx,
                task::ListOptions {
                    today,
                    verbose: self.verbose,
                },
                output,
            ),
            Commands::Show { id } => task::run_show(&ctx, id, output),
            Commands::Delete { id } => task::run_delete(&ctx, id, output),
            Commands::Set {
                id,
                priority,
                status,
            } => task::run_set(
                &ctx,
                task::SetOptions {
                    id,
                    priority,
                    status,
                },
                output,
            ),
            Commands::Edit {
                id,
                title,
                date,
                time,
            } => task::run_edit(
                &ctx,
                task::EditOptions {
                    id,
                    title,
                    date,
                    time,
                },
                output,
            ),
            Commands::Export { dir } => task::run_export(&ctx, dir, output),
            Commands::Tui => task::run_tui(ctx),
        }
    }
}
