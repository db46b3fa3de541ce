//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{todo_cmd, tui};
use crate::domain::{parse_due_date, TodoRef};
use crate::storage::Workspace;

#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about = "Local-first todo list for the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the todo store
    #[arg(long, global = true, env = "TODO_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a todo workspace (.todo/) in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add a todo
    Add {
        /// What needs doing
        text: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, short, value_parser = parse_due_arg)]
        due: Option<NaiveDate>,
    },

    /// List todos grouped into active and completed
    #[command(visible_alias = "ls")]
    List {
        /// Show only active todos
        #[arg(long, conflicts_with = "completed")]
        active: bool,

        /// Show only completed todos
        #[arg(long)]
        completed: bool,
    },

    /// Flip a todo between active and completed
    #[command(visible_alias = "done")]
    Toggle {
        /// Todo ID (t-xxxxxxx) or position
        target: TodoRef,
    },

    /// Delete a todo
    #[command(visible_alias = "rm")]
    Remove {
        /// Todo ID (t-xxxxxxx) or position
        target: TodoRef,
    },

    /// Change a todo's text or due date
    Edit {
        /// Todo ID (t-xxxxxxx) or position
        target: TodoRef,

        /// New text
        #[arg(long, short)]
        text: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, short, value_parser = parse_due_arg, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Open the interactive view
    Tui,
}

/// Parses a `--due` argument
fn parse_due_arg(s: &str) -> Result<NaiveDate, String> {
    match parse_due_date(s) {
        Ok(Some(date)) => Ok(date),
        Ok(None) => Err("due date cannot be empty".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        let output = Output::new(cli.format.unwrap_or_default(), cli.verbose);
        output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
        let workspace = Workspace::init(path)?;
        output.verbose_ctx("init", &format!("Created {}", workspace.dir().display()));
        output.success(&format!("Initialized todo workspace at {}", workspace.dir().display()));
        return Ok(());
    }

    let workspace = Workspace::locate(cli.dir.as_deref())?;
    let format = cli
        .format
        .unwrap_or_else(|| workspace.config().global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose(&format!(
        "Using {:?} workspace at {}",
        workspace.location(),
        workspace.dir().display()
    ));

    match cli.command {
        // Handled above
        Commands::Init { .. } => {}

        Commands::Add { text, due } => todo_cmd::add(&workspace, &output, &text, due)?,

        Commands::List { active, completed } => {
            output.verbose_ctx("list", &format!("active={}, completed={}", active, completed));
            todo_cmd::list(&workspace, &output, !completed, !active)?
        }

        Commands::Toggle { target } => todo_cmd::toggle(&workspace, &output, &target)?,
        Commands::Remove { target } => todo_cmd::remove(&workspace, &output, &target)?,

        Commands::Edit {
            target,
            text,
            due,
            clear_due,
        } => {
            let due = if clear_due { Some(None) } else { due.map(Some) };
            todo_cmd::edit(&workspace, &output, &target, text, due)?
        }

        Commands::Tui => tui::run(&workspace, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
