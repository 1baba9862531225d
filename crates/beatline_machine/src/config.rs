//! Engine configuration.

/// Configuration for an [`Engine`](crate::Engine).
///
/// Controls the execution trace and the per-step instruction budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Record every executed instruction in the trace buffer.
    pub trace_enabled: bool,

    /// Maximum number of trace records retained.
    pub trace_capacity: usize,

    /// Maximum instructions a single `step` call may execute (`None` = unbounded).
    pub max_burst: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trace_enabled: false,
            trace_capacity: 1000,
            max_burst: None,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration for debugging: tracing on, bounded bursts.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            trace_enabled: true,
            trace_capacity: 10_000,
            max_burst: Some(100_000),
        }
    }

    /// Builder method to enable/disable the execution trace.
    #[must_use]
    pub fn with_trace_enabled(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    /// Builder method to set the trace capacity.
    #[must_use]
    pub fn with_trace_capacity(mut self, capacity: usize) -> Self {
        self.trace_capacity = capacity;
        self
    }

    /// Builder method to set the per-step instruction budget.
    #[must_use]
    pub fn with_max_burst(mut self, limit: Option<usize>) -> Self {
        self.max_burst = limit;
        self
    }
}
