//! Pipeline configuration and its validation errors.

use std::error::Error;
use std::fmt;

// ── PipelineConfig ─────────────────────────────────────────────────

/// Configuration for a [`Pipeline`](crate::Pipeline).
///
/// Controls the size and naming of the worker pool that executes
/// deferred nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 16]`).
    pub worker_count: Option<usize>,
    /// Prefix of worker thread names; workers are named
    /// `{thread_name}-{index}`. Default: `"strata-worker"`.
    pub thread_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            thread_name: "strata-worker".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Configuration with exactly `n` workers.
    pub fn with_workers(n: usize) -> Self {
        Self {
            worker_count: Some(n),
            ..Self::default()
        }
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 16),
        }
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an explicit worker count is zero or the thread
    /// name prefix is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`PipelineConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `worker_count` was explicitly set to zero.
    ZeroWorkers,
    /// `thread_name` is empty.
    EmptyThreadName,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWorkers => write!(f, "worker_count must be at least 1"),
            Self::EmptyThreadName => write!(f, "thread_name must not be empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        assert_eq!(
            PipelineConfig::with_workers(0).validate(),
            Err(ConfigError::ZeroWorkers)
        );
    }

    #[test]
    fn empty_thread_name_rejected() {
        let cfg = PipelineConfig {
            thread_name: String::new(),
            ..PipelineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyThreadName));
    }

    #[test]
    fn explicit_counts_are_clamped() {
        assert_eq!(PipelineConfig::with_workers(0).resolved_worker_count(), 1);
        assert_eq!(PipelineConfig::with_workers(3).resolved_worker_count(), 3);
        assert_eq!(PipelineConfig::with_workers(500).resolved_worker_count(), 64);
    }

    #[test]
    fn auto_count_is_bounded() {
        let n = PipelineConfig::default().resolved_worker_count();
        assert!((1..=16).contains(&n));
    }
}
