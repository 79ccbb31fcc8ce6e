//! Command implementations for the parapat CLI
//!
//! Each command lives in its own module with its clap arguments and an
//! `execute` entry point.

pub mod config;
pub mod map;
pub mod sort;
pub mod sum;

use crate::cli::Output;
use crate::parallel::ExecutionContext;

/// Show the settings a pattern is about to run with (verbose only).
pub(crate) fn describe_context(ctx: &ExecutionContext, output: &Output) {
    output.verbose(&format!(
        "backend {}, degree {}, pool {} workers, ordered {}",
        ctx.backend(),
        ctx.concurrency_degree(),
        ctx.pool().size(),
        ctx.is_ordered()
    ));
}

fn join_values<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
