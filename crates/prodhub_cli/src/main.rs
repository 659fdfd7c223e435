//! `prodhub` command-line front end.
//!
//! # Responsibility
//! - Expose capture log, task list and timer operations as subcommands.
//! - Resolve data directory, config and logging before touching storage.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use prodhub_core::db::open_db;
use prodhub_core::{
    core_version, default_log_level, init_logging, CaptureLogStore, EntryId, HubConfig, Notifier,
    NotifyError, PomodoroTimer, Priority, SqliteKvRepository, TaskFilter, TaskId, TaskListStore,
    TickOutcome, NOTIFICATION_TITLE,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "prodhub", version, about = "Clipboard capture log, tasks and focus timer")]
struct Cli {
    /// Directory holding the database, config and logs.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Config file; defaults to `<data-dir>/prodhub.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage captured snippets.
    #[command(subcommand)]
    Capture(CaptureCommand),
    /// Manage the task list.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Run the work/break timer in the foreground.
    Timer(TimerArgs),
    /// Print the core version.
    Version,
}

#[derive(Debug, Subcommand)]
enum CaptureCommand {
    Add {
        content: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
    },
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    Edit {
        id: EntryId,
        content: String,
    },
    Rm {
        id: EntryId,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    Add {
        text: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    List {
        /// all | high | medium | low | archived
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
    },
    Done {
        id: TaskId,
    },
    Edit {
        id: TaskId,
        text: String,
    },
    Rm {
        id: TaskId,
    },
    Archive {
        id: TaskId,
    },
    Sort,
}

#[derive(Debug, Args)]
struct TimerArgs {
    /// Work phase length in minutes; overrides config.
    #[arg(long)]
    work: Option<u32>,
    /// Break phase length in minutes; overrides config.
    #[arg(long = "break")]
    break_minutes: Option<u32>,
    /// Task to link the session to.
    #[arg(long)]
    task: Option<TaskId>,
    /// Number of phases to run before exiting.
    #[arg(long, default_value_t = 1)]
    phases: u32,
}

/// Prints notifications to the terminal.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        println!("\n[{NOTIFICATION_TITLE}] {message}");
        Ok(())
    }
}

struct Session {
    config: HubConfig,
    db_path: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if matches!(cli.command, Command::Version) {
        println!("prodhub_core version={}", core_version());
        return Ok(());
    }

    let session = bootstrap(&cli)?;
    match cli.command {
        Command::Capture(command) => run_capture(&session, command),
        Command::Task(command) => run_task(&session, command),
        Command::Timer(args) => run_timer(&session, args).await,
        Command::Version => Ok(()),
    }
}

fn bootstrap(cli: &Cli) -> Result<Session> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_dir()
            .context("could not resolve a platform data directory; pass --data-dir")?
            .join("prodhub"),
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create `{}`", data_dir.display()))?;
    let data_dir = data_dir
        .canonicalize()
        .with_context(|| format!("failed to resolve `{}`", data_dir.display()))?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(prodhub_core::config::CONFIG_FILE_NAME));
    let config = HubConfig::load(&config_path)?;

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, &config.log_dir_in(&data_dir)) {
        eprintln!("warning: logging disabled: {err}");
    }

    let db_path = config.db_path_in(&data_dir);
    Ok(Session { config, db_path })
}

fn open_repo(session: &Session) -> Result<SqliteKvRepository> {
    let conn = open_db(&session.db_path)
        .with_context(|| format!("failed to open `{}`", session.db_path.display()))?;
    Ok(SqliteKvRepository::new(conn))
}

fn run_capture(session: &Session, command: CaptureCommand) -> Result<()> {
    let mut store = CaptureLogStore::load(open_repo(session)?)?;
    match command {
        CaptureCommand::Add {
            content,
            url,
            title,
        } => {
            if store.submit(&content, &url, &title)? {
                println!("captured ({} stored)", store.len());
            } else {
                println!("skipped: empty or already captured");
            }
        }
        CaptureCommand::List { search } => {
            let entries = store.query(&search);
            if entries.is_empty() {
                println!("No clipboard items found");
            }
            for entry in entries {
                println!("{}  {}", entry.id, entry.captured_at.to_rfc3339());
                println!("    {}", entry.content);
                if !entry.source_url.is_empty() {
                    println!("    {} ({})", entry.source_url, entry.source_title);
                }
            }
        }
        CaptureCommand::Edit { id, content } => {
            if !store.edit(id, &content)? {
                bail!("entry {id} not found, content empty, or duplicate");
            }
            println!("updated {id}");
        }
        CaptureCommand::Rm { id } => {
            if !store.remove(id)? {
                bail!("entry {id} not found");
            }
            println!("removed {id}");
        }
        CaptureCommand::Clear => {
            store.clear()?;
            println!("cleared");
        }
    }
    Ok(())
}

fn run_task(session: &Session, command: TaskCommand) -> Result<()> {
    let mut store = TaskListStore::load(open_repo(session)?)?;
    match command {
        TaskCommand::Add { text, priority } => {
            let task = store.add(&text, priority)?;
            println!("added {} [{}] {}", task.id, task.priority, task.text);
        }
        TaskCommand::List { filter } => {
            let tasks = store.filter(filter);
            if tasks.is_empty() {
                println!("No todos found");
            }
            for task in tasks {
                let mark = if task.completed { "x" } else { " " };
                let archived = if task.archived { " (archived)" } else { "" };
                println!(
                    "[{mark}] {} {:<6} {}{archived}",
                    task.id,
                    task.priority.as_str().to_uppercase(),
                    task.text
                );
            }
        }
        TaskCommand::Done { id } => {
            let task = store.toggle_complete(id)?;
            println!("{} completed={}", task.id, task.completed);
        }
        TaskCommand::Edit { id, text } => {
            let task = store.edit(id, &text)?;
            println!("{} {}", task.id, task.text);
        }
        TaskCommand::Rm { id } => {
            if !store.delete(id)? {
                bail!("task {id} not found");
            }
            println!("deleted {id}");
        }
        TaskCommand::Archive { id } => {
            let task = store.archive(id)?;
            println!("{} archived={}", task.id, task.archived);
        }
        TaskCommand::Sort => {
            store.sort()?;
            println!("sorted {} tasks", store.tasks().len());
        }
    }
    Ok(())
}

async fn run_timer(session: &Session, args: TimerArgs) -> Result<()> {
    let tasks = TaskListStore::load(open_repo(session)?)?;
    if let Some(id) = args.task {
        match tasks.get(id) {
            Some(task) if task.is_actionable() => {}
            Some(_) => bail!("task {id} is completed or archived"),
            None => bail!("task {id} not found"),
        }
    }

    let mut settings = session.config.timer_settings();
    if let Some(minutes) = args.work {
        settings.work_secs = minutes.saturating_mul(60);
    }
    if let Some(minutes) = args.break_minutes {
        settings.break_secs = minutes.saturating_mul(60);
    }
    settings.auto_start_next_phase = true;

    let mut timer = PomodoroTimer::new(settings, TerminalNotifier);
    timer.select_task(args.task);
    timer.start();
    log::info!(
        "event=timer_session module=cli status=start phases={} task_selected={}",
        args.phases,
        args.task.is_some()
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;
    let mut completed = 0;
    while completed < args.phases {
        print!(
            "\r{}  {}   ",
            timer.remaining_clock(),
            timer.status_label(tasks.tasks())
        );
        std::io::stdout().flush().ok();

        tokio::select! {
            _ = ticker.tick() => {
                if let TickOutcome::PhaseCompleted { .. } = timer.tick() {
                    completed += 1;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nstopped");
                timer.reset();
                return Ok(());
            }
        }
    }
    println!();
    Ok(())
}
