//! Command-line interface for parapat
//!
//! A small driver that runs the patterns against an execution context built
//! from configuration and command-line overrides.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

pub mod commands;
mod output;

pub use output::Output;

use crate::config::ParapatConfig;
use crate::parallel::{BackendKind, ExecutionContext};

/// parapat - parallel patterns over interchangeable back ends
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-result output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Concurrency degree (overrides configuration)
    #[arg(short, long, global = true, env = "PARAPAT_THREADS")]
    pub threads: Option<usize>,

    /// Concurrency back end (overrides configuration)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Back ends selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Sequential,
    Native,
    TaskGroup,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sequential => BackendKind::Sequential,
            BackendArg::Native => BackendKind::Native,
            BackendArg::TaskGroup => BackendKind::TaskGroup,
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Sort integers with divide-and-conquer merge sort
    Sort(commands::sort::SortArgs),
    /// Sum 1..=N with divide-and-conquer
    Sum(commands::sum::SumArgs),
    /// Square integers with the map pattern
    Map(commands::map::MapArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        match &self.command {
            Some(Commands::Sort(args)) => commands::sort::execute(args, &self.context()?, &output),
            Some(Commands::Sum(args)) => commands::sum::execute(args, &self.context()?, &output),
            Some(Commands::Map(args)) => commands::map::execute(args, &mut self.context()?, &output),
            Some(Commands::Config(ConfigCommands::Show)) => {
                commands::config::show(self.config.as_deref(), &output)
            }
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }

    /// Build the execution context from configuration plus CLI overrides.
    fn context(&self) -> Result<ExecutionContext> {
        let config = ParapatConfig::load_with_custom_config(self.config.as_deref())?;
        let mut execution = config.execution()?;

        if let Some(threads) = self.threads {
            execution.concurrency_degree = threads;
            execution.auto_degree = false;
        }
        if let Some(backend) = self.backend {
            execution.backend = backend.into();
        }

        ExecutionContext::from_config(&execution).context("failed to build execution context")
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Logs go to stderr so results on stdout stay machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
