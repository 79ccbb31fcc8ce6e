use anyhow::{Result, bail};
use clap::Args;

use super::describe_context;
use crate::cli::Output;
use crate::parallel::ExecutionContext;
use crate::patterns::divide_and_conquer;

#[derive(Args, Debug)]
pub struct SumArgs {
    /// Upper bound of the range 1..=N
    pub n: u64,

    /// Ranges at most this long are summed directly
    #[arg(long, default_value_t = 1024)]
    pub grain: u64,

    /// Pieces each range is split into
    #[arg(long, default_value_t = 2)]
    pub fanout: u64,
}

pub fn execute(args: &SumArgs, ctx: &ExecutionContext, output: &Output) -> Result<()> {
    if args.fanout < 2 {
        bail!("--fanout must be at least 2");
    }
    describe_context(ctx, output);

    let total = range_sum(ctx, args.n, args.grain, args.fanout)?;
    output.result(&total.to_string());

    let expected = u128::from(args.n) * (u128::from(args.n) + 1) / 2;
    if total == expected {
        output.success("matches n(n+1)/2");
    } else {
        bail!("sum {} differs from closed form {}", total, expected);
    }
    Ok(())
}

/// Sum `1..=n` by splitting the range into `fanout` pieces until each is at
/// most `grain` long.
pub fn range_sum(ctx: &ExecutionContext, n: u64, grain: u64, fanout: u64) -> Result<u128> {
    let grain = grain.max(1);
    let total = divide_and_conquer(
        ctx,
        (1u64, n),
        0u128,
        |range: &(u64, u64)| split_range(*range, grain, fanout),
        |(lo, hi)| (lo..=hi).map(u128::from).sum(),
        |partial, acc| partial + acc,
    )?;
    Ok(total)
}

/// Contiguous pieces covering `lo..=hi`, or the range itself once it is no
/// longer than `grain`. Bounds near `u64::MAX` do not overflow.
fn split_range((lo, hi): (u64, u64), grain: u64, fanout: u64) -> Vec<(u64, u64)> {
    if hi < lo || hi - lo < grain || fanout < 2 {
        return vec![(lo, hi)];
    }
    // Equals ceil(len / fanout) without computing len = hi - lo + 1.
    let step = (hi - lo) / fanout + 1;
    (0..fanout)
        .map_while(|i| i.checked_mul(step).and_then(|offset| lo.checked_add(offset)))
        .take_while(|start| *start <= hi)
        .map(|start| (start, start.saturating_add(step - 1).min(hi)))
        .collect()
}
