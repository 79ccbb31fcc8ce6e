//! Map pattern: apply one operation to every element of a sequence.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::errors::{PatternError, PatternResult};
use crate::parallel::ExecutionContext;

type ChunkOutcome<R> = PatternResult<Vec<(usize, R)>>;

/// Single-pass baseline on the calling thread.
pub fn sequential<T, R, F>(items: Vec<T>, op: F) -> Vec<R>
where
    F: Fn(T) -> R,
{
    items.into_iter().map(op).collect()
}

/// Map `items` on the context's worker pool.
///
/// Items are cut into one contiguous chunk per usable worker (the smaller of
/// the concurrency degree and the pool size). Chunk results travel back
/// through a queue built from the context's queue policy. An ordered context
/// returns results in input order; an unordered one returns them chunk by
/// chunk as workers finish. With no usable worker the map runs sequentially.
pub fn map<T, R, F>(ctx: &ExecutionContext, items: Vec<T>, op: F) -> PatternResult<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let workers = ctx.concurrency_degree().min(ctx.pool().size());
    if workers == 0 || items.len() < 2 {
        return panic::catch_unwind(AssertUnwindSafe(|| sequential(items, op)))
            .map_err(PatternError::from_panic);
    }

    let total = items.len();
    let chunk_size = total.div_ceil(workers);
    let op = Arc::new(op);
    let results = Arc::new(ctx.make_queue::<ChunkOutcome<R>>());

    let mut chunks = 0usize;
    let mut pending = items.into_iter().enumerate().peekable();
    while pending.peek().is_some() {
        let chunk: Vec<(usize, T)> = pending.by_ref().take(chunk_size).collect();
        let op = op.clone();
        let results = results.clone();
        let registry = ctx.registry().clone();

        ctx.pool().submit(move || {
            let worker = registry.get_thread_id().ok();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                chunk
                    .into_iter()
                    .map(|(index, item)| (index, op(item)))
                    .collect::<Vec<_>>()
            }))
            .map_err(PatternError::from_panic);
            tracing::trace!(?worker, ok = outcome.is_ok(), "map chunk finished");
            if results.push(outcome).is_err() {
                tracing::warn!(?worker, "map result queue closed");
            }
        })?;
        chunks += 1;
    }
    tracing::debug!(total, chunks, ordered = ctx.is_ordered(), "map submitted");

    let mut collected = Vec::with_capacity(total);
    let mut failure = None;
    for _ in 0..chunks {
        match results.pop()? {
            Ok(values) => collected.extend(values),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }

    if ctx.is_ordered() {
        collected.sort_unstable_by_key(|(index, _)| *index);
    }
    Ok(collected.into_iter().map(|(_, value)| value).collect())
}
