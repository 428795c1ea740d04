use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use parking_lot::Mutex;
use lazy_static::lazy_static;

/// Metrics registry (simple, Prometheus-style counters)
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    counters: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_counter(&self, name: &str) {
        let mut counters = self.counters.lock();
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters.lock().clone()
    }

    /// Render all counters in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.snapshot() {
            let _ = writeln!(out, "# TYPE {} counter", name);
            let _ = writeln!(out, "{} {}", name, value);
        }
        out
    }
}

lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_render() {
        let m = MetricsRegistry::new();
        m.inc_counter("notary_requests_total");
        m.inc_counter("notary_requests_total");
        m.inc_counter("notary_errors_total");
        assert_eq!(m.counter("notary_requests_total"), 2);
        assert_eq!(m.counter("missing"), 0);

        let text = m.render();
        assert!(text.contains("# TYPE notary_errors_total counter\nnotary_errors_total 1\n"));
        assert!(text.contains("notary_requests_total 2\n"));
    }
}
