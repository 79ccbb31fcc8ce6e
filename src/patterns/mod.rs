//! Parallel patterns built on the execution context.
//!
//! Every pattern takes an [`ExecutionContext`](crate::parallel::ExecutionContext)
//! and has a sequential baseline with the same semantics.

pub mod divide_and_conquer;
pub mod map;

pub use divide_and_conquer::{DivideAndConquer, divide_and_conquer};
