use anyhow::Result;
use clap::Args;

use super::{describe_context, join_values};
use crate::cli::Output;
use crate::parallel::ExecutionContext;
use crate::patterns::divide_and_conquer;

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Integers to sort
    #[arg(required = true, allow_negative_numbers = true)]
    pub numbers: Vec<i64>,

    /// Slices of this length or shorter are sorted directly
    #[arg(long, default_value_t = 2)]
    pub grain: usize,
}

pub fn execute(args: &SortArgs, ctx: &ExecutionContext, output: &Output) -> Result<()> {
    describe_context(ctx, output);
    let sorted = merge_sort(ctx, args.numbers.clone(), args.grain)?;
    output.result(&join_values(&sorted));
    Ok(())
}

/// Divide-and-conquer merge sort: halve until `grain`, sort leaves, merge.
pub fn merge_sort(ctx: &ExecutionContext, numbers: Vec<i64>, grain: usize) -> Result<Vec<i64>> {
    let grain = grain.max(1);
    let sorted = divide_and_conquer(
        ctx,
        numbers,
        Vec::new(),
        |v: &Vec<i64>| {
            if v.len() <= grain {
                vec![v.clone()]
            } else {
                let mid = v.len() / 2;
                vec![v[..mid].to_vec(), v[mid..].to_vec()]
            }
        },
        |mut v| {
            v.sort_unstable();
            v
        },
        merge_sorted,
    )?;
    Ok(sorted)
}

fn merge_sorted(left: Vec<i64>, right: Vec<i64>) -> Vec<i64> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        if l <= r {
            merged.extend(left.next());
        } else {
            merged.extend(right.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    merged
}
