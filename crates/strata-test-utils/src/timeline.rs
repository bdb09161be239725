//! Execution timeline recorder for scheduler ordering tests.

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// One recorded closure execution.
#[derive(Clone, Debug)]
pub struct Span {
    pub label: String,
    pub start: Instant,
    pub end: Instant,
}

/// Shared, clonable log of [`Span`]s.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    spans: Arc<Mutex<Vec<Span>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, recording its start and end under `label`.
    pub fn record<R>(&self, label: &str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        let end = Instant::now();
        self.spans
            .lock()
            .expect("timeline lock poisoned")
            .push(Span {
                label: label.to_string(),
                start,
                end,
            });
        out
    }

    /// The span recorded under `label`.
    pub fn span(&self, label: &str) -> Option<Span> {
        self.spans
            .lock()
            .expect("timeline lock poisoned")
            .iter()
            .find(|s| s.label == label)
            .cloned()
    }

    /// Labels in completion order.
    pub fn labels(&self) -> Vec<String> {
        self.spans
            .lock()
            .expect("timeline lock poisoned")
            .iter()
            .map(|s| s.label.clone())
            .collect()
    }

    /// Whether `later` started no earlier than `earlier` finished.
    pub fn ordered(&self, earlier: &str, later: &str) -> bool {
        match (self.span(earlier), self.span(later)) {
            (Some(a), Some(b)) => b.start >= a.end,
            _ => false,
        }
    }
}
