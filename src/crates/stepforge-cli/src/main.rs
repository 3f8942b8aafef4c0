//! stepforge command line entry point
//!
//! Drives the engine against a state root directory (default `.stepforge/`):
//! workspace and checkpoint directories per project plus a JSON snapshot of
//! the in-memory store between invocations.

mod config;
mod output;
mod plan;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use stepforge_checkpoint::ZipCheckpointStore;
use stepforge_core::{Event, EventKind, MemoryStateStore, Project, StateStore, Step};
use stepforge_engine::{MirrorRunner, StepExecutor, WorkspaceLayout};
use stepforge_tools::{ArgumentValidator, ToolRegistry};

use config::ForgeConfig;

/// stepforge: preview, apply and roll back generated plan steps
#[derive(Parser, Debug)]
#[command(name = "stepforge")]
#[command(about = "Preview, apply and roll back generated plan steps", long_about = None)]
struct Args {
    /// State root directory
    #[arg(long, default_value = ".stepforge")]
    root: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Spawned command timeout in seconds (overrides config)
    #[arg(long)]
    command_timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a JSON plan file and create a new project
    Plan {
        /// Plan file: a JSON array of step specifications
        file: PathBuf,

        /// Project title
        #[arg(long, default_value = "Untitled Project")]
        title: String,

        /// Project goal
        #[arg(long, default_value = "")]
        goal: String,
    },
    /// List the current project's steps
    Status,
    /// Dry-run one step by its plan position
    Preview {
        #[arg(value_name = "STEP")]
        step: u32,
    },
    /// Apply one step by its plan position
    Apply {
        #[arg(value_name = "STEP")]
        step: u32,
    },
    /// Snapshot the workspace outside an apply cycle
    Checkpoint,
    /// Restore the most recent snapshot and reset error steps
    Rollback,
    /// Print the audit log
    Events,
    /// List recorded artifacts
    Artifacts,
}

struct App {
    root: PathBuf,
    store: MemoryStateStore,
    layout: WorkspaceLayout,
    executor: StepExecutor,
    mirror: MirrorRunner,
}

impl App {
    fn open(root: &Path, command_timeout: Duration) -> anyhow::Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create state root {}", root.display()))?;

        let store = state::load(root)?;
        let layout = WorkspaceLayout::new(root.join("workspace"));
        let checkpoints = Arc::new(ZipCheckpointStore::new(root.join("checkpoints")));
        let registry = Arc::new(ToolRegistry::builtin(command_timeout));
        let validator = ArgumentValidator::new();

        let executor = StepExecutor::new(
            registry.clone(),
            validator.clone(),
            checkpoints,
            Arc::new(store.clone()),
            layout.clone(),
        );
        let mirror = MirrorRunner::new(registry, validator, Arc::new(store.clone()), layout.clone());

        Ok(Self {
            root: root.to_path_buf(),
            store,
            layout,
            executor,
            mirror,
        })
    }

    /// The most recently created project in this state root
    async fn current_project(&self) -> anyhow::Result<Project> {
        self.store
            .projects()
            .await?
            .pop()
            .context("no project found; run `stepforge plan <file>` first")
    }

    /// Look a step up by its plan position within the current project
    async fn step_at(&self, position: u32) -> anyhow::Result<Step> {
        let project = self.current_project().await?;
        self.store
            .steps_for_project(project.id)
            .await?
            .into_iter()
            .find(|s| s.position == position)
            .with_context(|| format!("no step at position {position}"))
    }
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Plan { file, title, goal } => {
            let specs = plan::load_plan(&file)?;
            let project = Project::new(title, goal.clone());
            let steps = plan::into_steps(project.id, specs);
            let titles: Vec<&str> = steps.iter().map(|s| s.title.as_str()).collect();

            app.store
                .record_event(
                    Event::new(project.id, EventKind::Planned)
                        .with_payload(serde_json::json!({"goal": goal, "steps": titles})),
                )
                .await?;
            app.layout.ensure(project.id)?;

            info!(project = %project.id, steps = steps.len(), "plan loaded");
            let project_id = project.id;
            app.store.insert_project(project).await?;
            let mut planned = Vec::new();
            for step in steps {
                app.store.insert_step(step.clone()).await?;
                planned.push(step);
            }

            println!("project {project_id}");
            output::print_steps(&planned);
        }
        Command::Status => {
            let project = app.current_project().await?;
            println!("project {}  {}", project.id, project.title);
            let steps = app.store.steps_for_project(project.id).await?;
            output::print_steps(&steps);
        }
        Command::Preview { step } => {
            let step = app.step_at(step).await?;
            let report = app.mirror.preview(step.id).await?;
            output::print_preview(&report);
        }
        Command::Apply { step } => {
            let step = app.step_at(step).await?;
            let report = app
                .executor
                .apply(step.id)
                .await
                .with_context(|| format!("apply failed for step {} ({})", step.position, step.title))?;
            output::print_apply(&report);
        }
        Command::Checkpoint => {
            let project = app.current_project().await?;
            let handle = app.executor.checkpoint(project.id).await?;
            println!("checkpoint written: {}", handle.archive_path.display());
        }
        Command::Rollback => {
            let project = app.current_project().await?;
            let restored = app.executor.rollback(project.id).await?;
            if restored {
                println!("workspace restored to the most recent checkpoint");
            } else {
                println!("no checkpoints to restore");
            }
        }
        Command::Events => {
            let project = app.current_project().await?;
            let events = app.store.events_for_project(project.id).await?;
            output::print_events(&events);
        }
        Command::Artifacts => {
            let project = app.current_project().await?;
            let artifacts = app.store.artifacts_for_project(project.id).await?;
            output::print_artifacts(&artifacts);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ForgeConfig::load(&args.root)?;

    let level = if args.verbose {
        Level::DEBUG
    } else {
        match config.log_level.as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let command_timeout = Duration::from_secs(
        args.command_timeout.unwrap_or(config.command_timeout_secs),
    );
    let app = App::open(&args.root, command_timeout)?;

    // State is saved even when the command fails: an apply that errored has
    // already moved its step to `error`, and that must survive the exit.
    let result = run(&app, args.command).await;
    state::save(&app.root, &app.store).await?;
    result
}
