//! Scheduler configuration

use crate::error::{BatchError, Result};
use std::time::Duration;

/// Configuration for a scheduler instance.
///
/// One config per [`Batcher`] or [`Adder`]; instances never share
/// pending state, so call sites tune each one independently.
///
/// [`Batcher`]: crate::scheduler::Batcher
/// [`Adder`]: crate::scheduler::Adder
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Debounce window: a quiet period of this length with no new
    /// enqueues flushes whatever is pending.
    pub wait: Duration,
    /// Pending-entry count that forces an immediate flush without
    /// waiting for the timer.
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(500),
            max_batch_size: 25,
        }
    }
}

impl BatchConfig {
    /// Config for auto-save of a single editable record: every quiet
    /// period or every edit commits immediately.
    pub fn for_autosave() -> Self {
        Self {
            wait: Duration::from_millis(500),
            max_batch_size: 1,
        }
    }

    /// Config for bulk import: long window, large batches.
    pub fn for_bulk_import() -> Self {
        Self {
            wait: Duration::from_millis(1000),
            max_batch_size: 50,
        }
    }

    /// Validate the configuration. Called by scheduler constructors so
    /// misconfiguration fails at construction, never during operation.
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(BatchError::Misconfigured(
                "max_batch_size must be at least 1".into(),
            ));
        }
        if self.wait.is_zero() {
            return Err(BatchError::Misconfigured(
                "wait must be a non-zero duration".into(),
            ));
        }
        Ok(())
    }
}
