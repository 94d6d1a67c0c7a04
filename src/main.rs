use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskify::store::Deletion;
use taskify::task::DUE_DATE_FORMAT;
use taskify::view::{self, TerminalConfirm};
use taskify::{Config, FileStorage, FilterMode, Store, persist};
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "taskify")]
#[command(about = "Taskify - add, complete, filter and delete tasks from the terminal")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/taskify/taskify.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding saved tasks (overrides the config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task to the top of the list
    Add {
        /// Task text; words are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// List tasks
    List {
        /// Which tasks to show (default from config)
        #[arg(short, long, value_enum)]
        filter: Option<FilterMode>,
    },

    /// Mark a task complete, or undo completion
    Toggle { id: i64 },

    /// Replace a task's text
    Edit { id: i64, text: String },

    /// Delete a task after confirmation
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
    debug!(data_dir = ?data_dir, key = %config.storage_key, "Resolved storage");

    let storage = FileStorage::open(&data_dir)?;
    let key = config.storage_key.as_str();
    let mut store = persist::load(&storage, key)?;

    let command = cli.command.unwrap_or(Commands::List { filter: None });
    let now = Utc::now();

    match command {
        Commands::Add { text, due } => {
            let due = due.map(|d| d.format(DUE_DATE_FORMAT).to_string());
            let Some(id) = store.add(&text.join(" "), due.as_deref()).map(|t| t.id) else {
                println!("Nothing to add");
                return Ok(());
            };
            persist::save(&storage, key, &store)?;
            print_task(&store, id, now);
        }
        Commands::List { filter } => {
            let mode = filter.unwrap_or(config.default_filter);
            print!("{}", view::render(&store.filter(mode), mode, now));
        }
        Commands::Toggle { id } => {
            let completed = store.toggle(id).ok_or_else(|| not_found(id))?;
            persist::save(&storage, key, &store)?;
            println!("Task {} marked {}", id, if completed { "complete" } else { "active" });
        }
        Commands::Edit { id, text } => {
            if !store.edit(id, &text) {
                return Err(not_found(id));
            }
            persist::save(&storage, key, &store)?;
            print_task(&store, id, now);
        }
        Commands::Delete { id, yes } => {
            let outcome = if yes || !config.confirm_delete {
                store.delete(id, &mut true)
            } else {
                store.delete(id, &mut TerminalConfirm::stdio())
            };

            match outcome {
                Deletion::Removed(task) => {
                    persist::save(&storage, key, &store)?;
                    println!("Deleted task {}: {}", task.id, task.text);
                }
                Deletion::Declined => println!("Kept task {}", id),
                Deletion::NotFound => return Err(not_found(id)),
            }
        }
    }

    Ok(())
}

fn print_task(store: &Store, id: i64, now: chrono::DateTime<Utc>) {
    if let Some(task) = store.get(id) {
        print!("{}", view::render_task(task, now));
    }
}

fn not_found(id: i64) -> eyre::Report {
    eyre!("Task {} not found", id)
}
