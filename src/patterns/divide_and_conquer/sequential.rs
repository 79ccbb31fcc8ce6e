//! Purely recursive divide-and-conquer with no concurrency.
//!
//! This is the baseline the parallel scheduler reduces to once its thread
//! budget is exhausted, and the reference its results are checked against.

use super::{Callables, split_subproblems};

/// Solve `problem` recursively on the calling thread.
///
/// A `divide` result with fewer than two subproblems is a base case and
/// yields `op(problem)`. Otherwise each subproblem is solved starting from
/// `O::default()` and the partial results are folded into `init` in
/// subproblem order with `merge(partial, accumulator)`.
pub fn divide_and_conquer<P, O, D, F, M>(problem: P, init: O, divide: D, op: F, merge: M) -> O
where
    O: Default,
    D: Fn(&P) -> Vec<P>,
    F: Fn(P) -> O,
    M: Fn(O, O) -> O,
{
    let callables = Callables {
        divide: &divide,
        op: &op,
        merge: &merge,
    };
    solve(&callables, problem, init)
}

pub(super) fn solve<P, O, D, F, M>(c: &Callables<'_, D, F, M>, problem: P, init: O) -> O
where
    O: Default,
    D: Fn(&P) -> Vec<P>,
    F: Fn(P) -> O,
    M: Fn(O, O) -> O,
{
    let Some((first, rest)) = split_subproblems((c.divide)(&problem)) else {
        return (c.op)(problem);
    };

    let partials: Vec<O> = std::iter::once(first)
        .chain(rest)
        .map(|subproblem| solve(c, subproblem, O::default()))
        .collect();

    partials
        .into_iter()
        .fold(init, |acc, partial| (c.merge)(partial, acc))
}
