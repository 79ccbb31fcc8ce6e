//! Error types shared by the execution context and the patterns.

use std::any::Any;
use std::io;

use thiserror::Error;

/// Failures surfaced by the execution layer.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The host refused to start a concurrent task.
    #[error("failed to spawn concurrent task: {0}")]
    SpawnFailed(#[source] io::Error),

    /// A user-supplied callable panicked inside a task.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// The calling thread never registered with the identity registry.
    #[error("calling thread is not registered")]
    ThreadNotRegistered,

    /// The worker pool no longer accepts work.
    #[error("worker pool is closed")]
    PoolClosed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PatternError {
    /// Build a `TaskPanicked` error from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        PatternError::TaskPanicked(message)
    }
}

pub type PatternResult<T> = std::result::Result<T, PatternError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_messages() {
        let err = PatternError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "task panicked: boom");

        let err = PatternError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "task panicked: owned");

        let err = PatternError::from_panic(Box::new(42u8));
        assert!(matches!(err, PatternError::TaskPanicked(ref m) if m == "unknown panic payload"));
    }
}
