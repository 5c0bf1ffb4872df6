//! DevHub command-line entry point.
//!
//! # Responsibility
//! - Open a SQLite-backed workspace and run one command against it.
//! - Keep output deterministic for scripting and quick local checks.

use clap::{Parser, Subcommand};
use devhub_core::model::task::TaskDraft;
use devhub_core::{
    apply_format, BoardStatus, DropOutcome, MarkupFormat, SqliteStore, TaskStatus, Workspace,
    WorkspaceConfig,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "devhub", version, about = "Local-first DevHub workspace")]
struct Cli {
    /// Workspace database file.
    #[arg(long, default_value = "devhub.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Print record counts.
    Summary,
    /// Print the task board column by column.
    Board,
    /// Add a task to the `todo` column.
    AddTask {
        description: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Move a task to another column (todo, in-progress, done).
    MoveTask { id: String, status: String },
    /// Store the display name.
    SetName { name: String },
    /// Preview a toolbar format over a char selection.
    Format {
        text: String,
        start: usize,
        end: usize,
        format: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = WorkspaceConfig {
        log_dir: cli.log_dir,
        log_level: cli.log_level,
        ..WorkspaceConfig::default()
    };
    config.init_logging()?;

    match cli.command {
        Command::Ping => {
            println!("devhub_core ping={}", devhub_core::ping());
            println!("devhub_core version={}", devhub_core::core_version());
            Ok(())
        }
        Command::Format {
            text,
            start,
            end,
            format,
        } => {
            let format: MarkupFormat = format.parse()?;
            let edit = apply_format(&text, start, end, format)?;
            println!("{}", edit.new_text);
            println!("cursor={}", edit.cursor_start);
            Ok(())
        }
        command => {
            let store = SqliteStore::open(&cli.db)?;
            let mut workspace = Workspace::open(Arc::new(store), config)?;
            info!(
                "event=cli_command module=cli status=start db={}",
                cli.db.display()
            );
            run_workspace_command(&mut workspace, command)
        }
    }
}

fn run_workspace_command(workspace: &mut Workspace, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Summary => {
            let summary = workspace.summary();
            if let Some(name) = summary.user_name {
                println!("user={name}");
            }
            println!("projects={}", summary.projects);
            println!("tasks={} open={}", summary.tasks, summary.open_tasks);
            println!("notes={}", summary.notes);
            println!("tools={}", summary.tools);
            println!("learning_subjects={}", summary.learning_subjects);
        }
        Command::Board => {
            for column in workspace.tasks().columns() {
                println!("[{}] {}", column.status.as_str(), column.items.len());
                for task in column.items {
                    let label = task.title.as_deref().unwrap_or(task.description.as_str());
                    println!("  {} {}", task.id, label);
                }
            }
        }
        Command::AddTask {
            description,
            title,
            due,
        } => {
            let task = workspace.tasks().add(TaskDraft {
                title,
                due_date: due,
                ..TaskDraft::new(description)
            })?;
            println!("{}", task.id);
        }
        Command::MoveTask { id, status } => {
            let Some(target) = TaskStatus::parse(&status) else {
                return Err(format!("unknown status `{status}`").into());
            };
            match workspace.tasks().drop_onto(&id, target)? {
                DropOutcome::Moved { from, to } => {
                    println!("moved {id} {} -> {}", from.as_str(), to.as_str());
                }
                DropOutcome::Unchanged(status) => {
                    println!("unchanged {id} {}", status.as_str());
                }
                DropOutcome::MissingEntity | DropOutcome::UnknownStatus(_) => {
                    println!("no such task {id}");
                }
            }
        }
        Command::SetName { name } => {
            if !workspace.profile().set_name(&name)? {
                return Err("name cannot be blank".into());
            }
            println!("hello, {}", workspace.profile().first_name().unwrap_or(name));
        }
        Command::Ping | Command::Format { .. } => {}
    }
    Ok(())
}
