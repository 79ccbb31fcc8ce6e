use anyhow::Result;
use clap::Args;

use super::{describe_context, join_values};
use crate::cli::Output;
use crate::parallel::ExecutionContext;
use crate::patterns::map;

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Integers to square
    #[arg(required = true, allow_negative_numbers = true)]
    pub numbers: Vec<i64>,

    /// Emit results as workers finish instead of in input order
    #[arg(long)]
    pub unordered: bool,
}

pub fn execute(args: &MapArgs, ctx: &mut ExecutionContext, output: &Output) -> Result<()> {
    if args.unordered {
        ctx.disable_ordering();
    }
    describe_context(ctx, output);

    let squares = map::map(ctx, args.numbers.clone(), |x| x * x)?;
    output.result(&join_values(&squares));
    Ok(())
}
