//! Configuration management for parapat
//!
//! Settings are layered with figment: embedded defaults, then user and
//! project files, then `PARAPAT_` environment variables. See [`core`].

pub mod core;

use serde::{Deserialize, Serialize};

use crate::parallel::{BackendKind, DEFAULT_CONCURRENCY_DEGREE, DEFAULT_QUEUE_SIZE, QueueMode};

pub use self::core::ParapatConfig;

/// The `[execution]` section: how execution contexts are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Spawn budget and worker pool size
    pub concurrency_degree: usize,

    /// Derive the degree from available cores instead
    pub auto_degree: bool,

    /// Preserve input order in streaming patterns
    pub ordering: bool,

    /// Capacity of queues handed out by the context
    pub queue_size: usize,

    pub queue_mode: QueueMode,

    pub backend: BackendKind,

    /// Cap on automatically sized degrees (0 = no cap)
    pub max_threads: usize,

    /// Percentage of CPU cores to use when sizing automatically (1-100)
    pub thread_percentage: u8,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            concurrency_degree: DEFAULT_CONCURRENCY_DEGREE,
            auto_degree: false,
            ordering: true,
            queue_size: DEFAULT_QUEUE_SIZE,
            queue_mode: QueueMode::default(),
            backend: BackendKind::default(),
            max_threads: 0,
            thread_percentage: 75,
        }
    }
}
