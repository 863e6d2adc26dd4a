use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;
mod config;
mod file_store;
mod state;

use commands::{TaskAddArgs, TaskUpdateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ganttline",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GANTTLINE_BUILD_SHA"), ")"),
    about = "Plan projects on a day-by-day timeline and track drift against the plan"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, rename, recolor, delete and list projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Add, update, delete and list tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Draw a project's timeline with expected progress and drift
    Timeline {
        /// Project id or name
        project: String,

        /// Pixels per day (clamped to 14..=30; default from config)
        #[arg(long)]
        day_width: Option<f64>,

        /// Override today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Tasks pinned, starting or ending today, across all projects
    Today {
        /// Override today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Print every project and task as JSON
    Snapshot,

    /// Manage ~/.ganttline/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create a project
    Add {
        name: String,

        /// Hex color, #rgb or #rrggbb (default from config)
        #[arg(long)]
        color: Option<String>,
    },

    /// Rename a project
    Rename { project: String, name: String },

    /// Change a project's color
    Color { project: String, color: String },

    /// Delete a project and all of its tasks
    Delete { project: String },

    /// List projects with done/total, blocked and next-up
    List {
        /// Override today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Add a task; without --start/--end it is chained after the last task
    Add {
        /// Project id or name
        project: String,
        title: String,

        #[arg(long)]
        desc: Option<String>,

        /// Planned start (YYYY-MM-DD); needs --end
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Planned end (YYYY-MM-DD); needs --start
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Inclusive days for a chained task (default from config)
        #[arg(long, conflicts_with_all = ["start", "end"])]
        duration: Option<i64>,

        /// 0-100; out-of-range values are clamped
        #[arg(long, allow_hyphen_values = true)]
        progress: Option<i64>,

        /// Work-breakdown label, e.g. 1.2
        #[arg(long)]
        wbs: Option<String>,

        /// Use the next free 1.N label
        #[arg(long, conflicts_with = "wbs")]
        auto_wbs: bool,

        /// Pin to the today list
        #[arg(long)]
        pin: bool,

        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,

        /// Override today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Update fields of a task
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_desc")]
        desc: Option<String>,

        #[arg(long)]
        clear_desc: bool,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long, conflicts_with = "clear_actual")]
        actual_start: Option<String>,

        #[arg(long, conflicts_with = "clear_actual")]
        actual_end: Option<String>,

        /// Remove both actual dates
        #[arg(long)]
        clear_actual: bool,

        /// 0-100; also re-derives status unless --status is given
        #[arg(long, allow_hyphen_values = true)]
        progress: Option<i64>,

        /// todo, doing, blocked or done
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        pin: bool,

        #[arg(long)]
        unpin: bool,

        #[arg(long, conflicts_with = "clear_wbs")]
        wbs: Option<String>,

        #[arg(long)]
        clear_wbs: bool,

        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },

    /// Delete a task
    Delete { id: String },

    /// List a project's tasks in order
    List {
        /// Project id or name
        project: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,

    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config(&config::load_config()?)?,
        },

        Command::Project { command } => {
            let cfg = config::load_config()?;
            let mut ws = commands::open_workspace()?;
            match command {
                ProjectCommand::Add { name, color } => {
                    commands::project_add(&mut ws, &cfg, &name, color.as_deref())?
                }
                ProjectCommand::Rename { project, name } => {
                    commands::project_rename(&mut ws, &project, &name)?
                }
                ProjectCommand::Color { project, color } => {
                    commands::project_color(&mut ws, &project, &color)?
                }
                ProjectCommand::Delete { project } => commands::project_delete(&mut ws, &project)?,
                ProjectCommand::List { today } => {
                    commands::project_list(&ws, &cfg, today.as_deref())?
                }
            }
        }

        Command::Task { command } => {
            let cfg = config::load_config()?;
            let mut ws = commands::open_workspace()?;
            match command {
                TaskCommand::Add {
                    project,
                    title,
                    desc,
                    start,
                    end,
                    duration,
                    progress,
                    wbs,
                    auto_wbs,
                    pin,
                    order,
                    today,
                } => {
                    let args = TaskAddArgs {
                        title,
                        description: desc,
                        start,
                        end,
                        duration,
                        progress,
                        wbs,
                        auto_wbs,
                        pin,
                        order,
                        today,
                    };
                    commands::task_add(&mut ws, &cfg, &project, args)?;
                }
                TaskCommand::Update {
                    id,
                    title,
                    desc,
                    clear_desc,
                    start,
                    end,
                    actual_start,
                    actual_end,
                    clear_actual,
                    progress,
                    status,
                    pin,
                    unpin,
                    wbs,
                    clear_wbs,
                    order,
                } => {
                    let args = TaskUpdateArgs {
                        title,
                        description: desc,
                        clear_description: clear_desc,
                        start,
                        end,
                        actual_start,
                        actual_end,
                        clear_actual,
                        progress,
                        status,
                        pin,
                        unpin,
                        wbs,
                        clear_wbs,
                        order,
                    };
                    commands::task_update(&mut ws, &id, args)?;
                }
                TaskCommand::Delete { id } => commands::task_delete(&mut ws, &id)?,
                TaskCommand::List { project } => commands::task_list(&ws, &project)?,
            }
        }

        Command::Timeline { project, day_width, today } => {
            let cfg = config::load_config()?;
            let ws = commands::open_workspace()?;
            commands::timeline(&ws, &cfg, &project, day_width, today.as_deref())?;
        }

        Command::Today { today } => {
            let cfg = config::load_config()?;
            let ws = commands::open_workspace()?;
            commands::today(&ws, &cfg, today.as_deref())?;
        }

        Command::Snapshot => {
            let ws = commands::open_workspace()?;
            commands::snapshot(&ws)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays pipeable.
/// `GANTTLINE_LOG` sets the filter; `GANTTLINE_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("GANTTLINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_json = std::env::var("GANTTLINE_LOG_JSON")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
