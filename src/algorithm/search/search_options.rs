use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// per-query budgets and cancellation for a search kernel.
/// cloning shares the same cancellation flag across a bidirectional search's
/// two frontiers.
#[derive(Clone, Default)]
pub struct SearchOptions {
    pub max_weight: Option<f64>,
    pub max_settled: Option<usize>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl SearchOptions {
    pub fn new(max_weight: Option<f64>, max_settled: Option<usize>) -> Self {
        SearchOptions {
            max_weight,
            max_settled,
            cancelled: None,
        }
    }

    pub fn with_cancellation(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    pub fn exceeds_max_weight(&self, weight: f64) -> bool {
        self.max_weight.is_some_and(|max| weight > max)
    }

    pub fn exceeds_max_settled(&self, settled: usize) -> bool {
        self.max_settled.is_some_and(|max| settled >= max)
    }
}
