//! # parapat - Parallel Patterns over Interchangeable Back Ends
//!
//! One algorithmic interface per pattern, runnable unmodified on a sequential,
//! native-thread, task-group or runtime-selected back end.
//!
//! ## Features
//!
//! - **Execution context**: concurrency degree, ordering, queue policy, an owned
//!   worker pool and a thread-identity registry
//! - **Divide and conquer**: adaptive parallel recursion under a shared,
//!   decrement-only thread budget with deterministic merging
//! - **Map**: pool-backed map that honours the context's ordering flag
//!
//! ## Quick Start
//!
//! ```rust
//! use parapat::parallel::ExecutionContext;
//! use parapat::patterns::divide_and_conquer;
//!
//! let ctx = ExecutionContext::with_threads(2).unwrap();
//! let total = divide_and_conquer(
//!     &ctx,
//!     (1u64, 100u64),
//!     0u64,
//!     |&(lo, hi): &(u64, u64)| {
//!         if hi - lo < 10 {
//!             vec![(lo, hi)]
//!         } else {
//!             let mid = (lo + hi) / 2;
//!             vec![(lo, mid), (mid + 1, hi)]
//!         }
//!     },
//!     |(lo, hi)| (lo..=hi).sum(),
//!     |partial, acc| partial + acc,
//! )
//! .unwrap();
//! assert_eq!(total, 5050);
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod parallel;
pub mod patterns;

pub use cli::{Cli, Output};
pub use config::ParapatConfig;
pub use errors::{PatternError, PatternResult};
pub use parallel::ExecutionContext;

/// Result type alias for CLI and configuration operations
pub type Result<T> = anyhow::Result<T>;
