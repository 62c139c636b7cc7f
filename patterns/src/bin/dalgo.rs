//! `dalgo`: list and run the data-algorithm examples.

use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use dalgo_common::SessionConfig;
use dalgo_common::config::DEFAULT_MASTER;
use dalgo_core::create_session_with;
use dalgo_patterns::{Example, find_example, registry};
use tracing::info;

#[derive(Parser)]
#[clap(name = "dalgo")]
#[clap(version)]
#[clap(about = "Data algorithms on a local partitioned engine", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lists the examples grouped by topic.
    List,
    /// Runs one example.
    Run {
        /// Example id, as printed by `dalgo list`.
        id: String,
        #[clap(flatten)]
        session: SessionArgs,
    },
    /// Runs every example in order.
    RunAll {
        #[clap(flatten)]
        session: SessionArgs,
    },
}

#[derive(Args, Clone)]
struct SessionArgs {
    /// `local`, `local[N]` or `local[*]` [default: local[*]].
    #[clap(long)]
    master: Option<String>,

    /// Partitions used by shuffles.
    #[clap(long)]
    shuffle_partitions: Option<usize>,

    /// Memory cap for DataFrame work, e.g. `512m` or `2g`.
    #[clap(long)]
    driver_memory: Option<String>,

    /// Console log level, e.g. `INFO`.
    #[clap(long)]
    log_level: Option<String>,

    /// Print a task counter for every RDD job.
    #[clap(long)]
    progress: bool,
}

impl SessionArgs {
    /// Defaults, then `DALGO_*` variables, then flags.
    fn config_for(&self, id: &str) -> anyhow::Result<SessionConfig> {
        let base = SessionConfig::for_example(Some(id), DEFAULT_MASTER)?.with_env_overrides()?;
        self.apply(base)
    }

    fn apply(&self, mut config: SessionConfig) -> anyhow::Result<SessionConfig> {
        if let Some(master) = &self.master {
            config = config.with_master(master)?;
        }
        if let Some(partitions) = self.shuffle_partitions {
            config = config.with_shuffle_partitions(partitions)?;
        }
        if let Some(memory) = &self.driver_memory {
            config = config.with_driver_memory(memory)?;
        }
        if let Some(level) = &self.log_level {
            config = config.with_log_level(level);
        }
        if self.progress {
            config = config.with_console_progress(true);
        }
        Ok(config)
    }
}

fn list() {
    let examples = registry();
    let mut topics: Vec<&str> = Vec::new();
    for example in &examples {
        if !topics.contains(&example.topic) {
            topics.push(example.topic);
        }
    }
    for topic in topics {
        println!("{topic}:");
        for example in examples.iter().filter(|e| e.topic == topic) {
            println!("  {:26} {}", example.id, example.summary);
        }
    }
}

async fn run_example(example: &Example, session: &SessionArgs) -> anyhow::Result<()> {
    let config = session.config_for(example.id)?;
    let ctx = create_session_with(config)?;
    info!(example = example.id, app = %ctx.app_name(), "running example");
    (example.run)(&ctx)
        .await
        .with_context(|| format!("example '{}' failed", example.id))
}

async fn dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Run { id, session } => {
            let example = find_example(&id).ok_or_else(|| {
                let ids: Vec<&str> = registry().iter().map(|e| e.id).collect();
                anyhow!("unknown example '{id}'; valid ids: {}", ids.join(", "))
            })?;
            run_example(&example, &session).await
        }
        Command::RunAll { session } => {
            for example in registry() {
                run_example(&example, &session).await?;
                println!();
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
