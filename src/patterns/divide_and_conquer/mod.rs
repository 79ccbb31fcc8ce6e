//! Budget-gated parallel divide-and-conquer.
//!
//! Each top-level call gets a [`ThreadBudget`] initialised to the context's
//! concurrency degree and shared by the whole call tree. At every node:
//!
//! ```text
//! 1. budget exhausted on entry  -> sequential recursion for this subtree
//! 2. divide(problem)            -> fewer than two pieces: op(problem)
//! 3. pieces[1..] in order       -> spawn while budget can be taken,
//!                                  then solve the rest sequentially in place
//! 4. pieces[0]                  -> this algorithm, on the current thread
//! 5. join                       -> wait for tasks spawned at this node
//! 6. fold                       -> merge(slot, acc) in ascending slot order
//! ```
//!
//! Slots are index-aligned with `divide`'s output, so the result does not
//! depend on which task finishes first.

pub mod sequential;

use std::panic::{self, AssertUnwindSafe};
use std::vec;

use crate::errors::{PatternError, PatternResult};
use crate::parallel::{Backend, BackendKind, ExecutionContext, Spawner, ThreadBudget};

pub(crate) struct Callables<'a, D, F, M> {
    pub(crate) divide: &'a D,
    pub(crate) op: &'a F,
    pub(crate) merge: &'a M,
}

/// Split off the first subproblem when there are at least two.
pub(crate) fn split_subproblems<P>(subproblems: Vec<P>) -> Option<(P, vec::IntoIter<P>)> {
    if subproblems.len() < 2 {
        return None;
    }
    let mut iter = subproblems.into_iter();
    iter.next().map(|first| (first, iter))
}

/// Divide-and-conquer scheduler bound to an execution context.
pub struct DivideAndConquer<'ctx> {
    ctx: &'ctx ExecutionContext,
    backend: Option<Backend>,
}

impl<'ctx> DivideAndConquer<'ctx> {
    /// Use the back end configured on the context.
    pub fn new(ctx: &'ctx ExecutionContext) -> Self {
        Self { ctx, backend: None }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.as_ref().map_or(self.ctx.backend(), Backend::kind)
    }

    /// Solve `problem` with a fresh budget of `concurrency_degree` spawns.
    pub fn run<P, O, D, F, M>(&self, problem: P, init: O, divide: D, op: F, merge: M) -> PatternResult<O>
    where
        P: Send,
        O: Default + Send,
        D: Fn(&P) -> Vec<P> + Sync,
        F: Fn(P) -> O + Sync,
        M: Fn(O, O) -> O + Sync,
    {
        let backend = match &self.backend {
            Some(backend) => backend.clone(),
            None => self.ctx.spawner()?,
        };
        run_with(
            &backend,
            self.ctx.concurrency_degree(),
            problem,
            init,
            divide,
            op,
            merge,
        )
    }
}

/// Solve `problem` on the context's configured back end.
pub fn divide_and_conquer<P, O, D, F, M>(
    ctx: &ExecutionContext,
    problem: P,
    init: O,
    divide: D,
    op: F,
    merge: M,
) -> PatternResult<O>
where
    P: Send,
    O: Default + Send,
    D: Fn(&P) -> Vec<P> + Sync,
    F: Fn(P) -> O + Sync,
    M: Fn(O, O) -> O + Sync,
{
    DivideAndConquer::new(ctx).run(problem, init, divide, op, merge)
}

/// Solve `problem` on any spawner with an initial budget of `degree`.
///
/// A panic in `divide`, `op` or `merge` aborts the whole computation and is
/// reported as [`PatternError::TaskPanicked`].
pub fn run_with<S, P, O, D, F, M>(
    spawner: &S,
    degree: usize,
    problem: P,
    init: O,
    divide: D,
    op: F,
    merge: M,
) -> PatternResult<O>
where
    S: Spawner,
    P: Send,
    O: Default + Send,
    D: Fn(&P) -> Vec<P> + Sync,
    F: Fn(P) -> O + Sync,
    M: Fn(O, O) -> O + Sync,
{
    let budget = ThreadBudget::new(degree);
    let callables = Callables {
        divide: &divide,
        op: &op,
        merge: &merge,
    };

    tracing::debug!(degree, "divide and conquer started");
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        solve(spawner, &budget, &callables, problem, init)
    }))
    .map_err(PatternError::from_panic)?;
    tracing::debug!(unused_budget = budget.remaining(), "divide and conquer finished");
    result
}

fn solve<S, P, O, D, F, M>(
    spawner: &S,
    budget: &ThreadBudget,
    c: &Callables<'_, D, F, M>,
    problem: P,
    init: O,
) -> PatternResult<O>
where
    S: Spawner,
    P: Send,
    O: Default + Send,
    D: Fn(&P) -> Vec<P> + Sync,
    F: Fn(P) -> O + Sync,
    M: Fn(O, O) -> O + Sync,
{
    if budget.is_exhausted() {
        return Ok(sequential::solve(c, problem, init));
    }

    let Some((first, rest)) = split_subproblems((c.divide)(&problem)) else {
        return Ok((c.op)(problem));
    };

    let mut slots: Vec<Option<PatternResult<O>>> =
        std::iter::repeat_with(|| None).take(rest.len() + 1).collect();
    let (first_slot, rest_slots) = slots.split_at_mut(1);

    spawner.scope(|group| -> PatternResult<()> {
        let mut spawned = 0usize;
        for (subproblem, slot) in rest.zip(rest_slots.iter_mut()) {
            if budget.try_acquire() {
                group.submit(Box::new(move || {
                    *slot = Some(solve(spawner, budget, c, subproblem, O::default()));
                }))?;
                spawned += 1;
            } else {
                *slot = Some(Ok(sequential::solve(c, subproblem, O::default())));
            }
        }
        if spawned > 0 {
            tracing::trace!(spawned, remaining = budget.remaining(), "spawned sibling subproblems");
        }

        first_slot[0] = Some(solve(spawner, budget, c, first, O::default()));
        Ok(())
    })??;

    let mut acc = init;
    for slot in slots {
        let partial = slot.ok_or_else(|| {
            PatternError::TaskPanicked("subproblem finished without a result".to_string())
        })??;
        acc = (c.merge)(partial, acc);
    }
    Ok(acc)
}
