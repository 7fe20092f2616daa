use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fetchboard::fetch::Orchestrator;
use fetchboard::tasks::{JsonFileStore, TaskList};
use fetchboard::widgets::{self, WidgetKind};
use fetchboard::Config;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Dashboard widgets with fallback providers, and a task list
#[derive(Parser, Debug)]
#[command(name = "fetchboard", version, about, long_about = None)]
struct Args {
    /// Per-attempt provider timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Directory holding task files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage key of the task list
    #[arg(long, global = true)]
    storage_key: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print widgets (all of them if none are named)
    Show {
        #[arg(value_enum)]
        widgets: Vec<WidgetKind>,
    },
    /// Manage the task list
    #[command(subcommand)]
    Task(TaskCommand),
    /// Print the effective settings
    Config {
        /// Store the given --timeout-ms, --data-dir and --storage-key in the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Print all tasks
    List,
    /// Add a task
    Add { text: Vec<String> },
    /// Mark a task done, or not done again
    Toggle { id: String },
    /// Delete a task
    Remove { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("fetchboard started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("fetchboard").join("fetchboard.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".fetchboard").join("fetchboard.log");
    }
    PathBuf::from("fetchboard.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;
    let config = Config::load();

    match &args.command {
        Command::Show { widgets } => show(&args, &config, widgets).await,
        Command::Task(command) => task(&args, &config, command),
        Command::Config { save } => show_config(&args, config, *save),
    }
}

async fn show(args: &Args, config: &Config, kinds: &[WidgetKind]) -> Result<()> {
    let options = config.effective_fetch_options(args.timeout_ms)?;
    let orchestrator = Orchestrator::with_http(options)?;
    let location = config.effective_location();
    let kinds: Vec<WidgetKind> = if kinds.is_empty() {
        WidgetKind::ALL.to_vec()
    } else {
        kinds.to_vec()
    };

    // Ctrl-C tears the whole screen down; pending widgets write nothing
    let scope = CancellationToken::new();
    let _guard = scope.clone().drop_guard();
    let interrupt = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling pending fetches");
            interrupt.cancel();
        }
    });

    let reports = join_all(
        kinds
            .iter()
            .map(|kind| widgets::resolve_widget(&orchestrator, *kind, location, &scope)),
    )
    .await;

    if scope.is_cancelled() {
        eprintln!("Interrupted");
        return Ok(());
    }

    for report in reports {
        println!("{}", report?);
    }

    Ok(())
}

fn task(args: &Args, config: &Config, command: &TaskCommand) -> Result<()> {
    let store = JsonFileStore::new(config.effective_data_dir(args.data_dir.as_deref()));
    let key = config.effective_storage_key(args.storage_key.as_deref());
    let mut list = TaskList::load(Arc::new(store), key)?;

    match command {
        TaskCommand::List => {}
        TaskCommand::Add { text } => match list.add_task(&text.join(" "))? {
            Some(task) => println!("Added {}", task.id),
            None => eprintln!("Nothing to add"),
        },
        TaskCommand::Toggle { id } => {
            if !list.toggle_task(id)? {
                anyhow::bail!("No task with id {}", id);
            }
        }
        TaskCommand::Remove { id } => {
            if !list.remove_task(id)? {
                anyhow::bail!("No task with id {}", id);
            }
        }
    }

    for task in list.tasks() {
        let mark = if task.complete { "x" } else { " " };
        println!("[{}] {}  {}", mark, task.id, task.text);
    }

    Ok(())
}

fn show_config(args: &Args, mut config: Config, save: bool) -> Result<()> {
    if save {
        if args.timeout_ms.is_some() {
            config.timeout_ms = args.timeout_ms;
        }
        if args.data_dir.is_some() {
            config.data_dir = args.data_dir.clone();
        }
        if args.storage_key.is_some() {
            config.storage_key = args.storage_key.clone();
        }
        config.save()?;
    }

    let options = config.effective_fetch_options(args.timeout_ms)?;
    let location = config.effective_location();
    match Config::config_path() {
        Some(path) => println!("config file:  {}", path.display()),
        None => println!("config file:  (none)"),
    }
    println!("timeout:      {} ms", options.timeout().as_millis());
    println!(
        "data dir:     {}",
        config.effective_data_dir(args.data_dir.as_deref()).display()
    );
    println!(
        "storage key:  {}",
        config.effective_storage_key(args.storage_key.as_deref())
    );
    println!("location:     {}, {}", location.latitude, location.longitude);

    Ok(())
}
