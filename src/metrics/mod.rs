use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the translation memory
#[derive(Clone)]
pub struct TmMetrics {
    // Counters
    pub documents_added: Counter,
    pub domains_deleted: Counter,
    pub stale_events: Counter,
    pub commits: Counter,
    pub rollbacks: Counter,
    pub searches_total: Counter,

    // Gauges
    pub live_documents: Gauge,

    // Histograms
    pub search_latency: Histogram,
    pub batch_size: Histogram,

    registry: Arc<Registry>,
}

impl TmMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let documents_added = Counter::with_opts(Opts::new(
            "transmem_documents_added_total",
            "Total number of translation units committed",
        ))?;
        registry.register(Box::new(documents_added.clone()))?;

        let domains_deleted = Counter::with_opts(Opts::new(
            "transmem_domains_deleted_total",
            "Total number of domain deletions committed",
        ))?;
        registry.register(Box::new(domains_deleted.clone()))?;

        let stale_events = Counter::with_opts(Opts::new(
            "transmem_stale_events_total",
            "Replayed or out-of-order events skipped by the channel ledger",
        ))?;
        registry.register(Box::new(stale_events.clone()))?;

        let commits = Counter::with_opts(Opts::new(
            "transmem_commits_total",
            "Total number of successful index commits",
        ))?;
        registry.register(Box::new(commits.clone()))?;

        let rollbacks = Counter::with_opts(Opts::new(
            "transmem_rollbacks_total",
            "Total number of rolled back transactions",
        ))?;
        registry.register(Box::new(rollbacks.clone()))?;

        let searches_total = Counter::with_opts(Opts::new(
            "transmem_searches_total",
            "Total number of searches",
        ))?;
        registry.register(Box::new(searches_total.clone()))?;

        let live_documents = Gauge::with_opts(Opts::new(
            "transmem_live_documents",
            "Live documents in the last committed snapshot",
        ))?;
        registry.register(Box::new(live_documents.clone()))?;

        let search_latency = Histogram::with_opts(
            HistogramOpts::new("transmem_search_latency_seconds", "Search latency")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        )?;
        registry.register(Box::new(search_latency.clone()))?;

        let batch_size = Histogram::with_opts(
            HistogramOpts::new(
                "transmem_batch_size",
                "Number of translation units per ingested batch",
            )
            .buckets(vec![1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]),
        )?;
        registry.register(Box::new(batch_size.clone()))?;

        Ok(Self {
            documents_added,
            domains_deleted,
            stale_events,
            commits,
            rollbacks,
            searches_total,
            live_documents,
            search_latency,
            batch_size,
            registry: Arc::new(registry),
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a successful commit
    pub fn record_commit(&self, added: usize, domains_deleted: usize, live_documents: u64) {
        self.commits.inc();
        self.documents_added.inc_by(added as f64);
        self.domains_deleted.inc_by(domains_deleted as f64);
        self.live_documents.set(live_documents as f64);
    }

    pub fn record_rollback(&self) {
        self.rollbacks.inc();
    }

    pub fn record_stale(&self, count: usize) {
        self.stale_events.inc_by(count as f64);
    }

    pub fn record_search(&self, duration_secs: f64) {
        self.searches_total.inc();
        self.search_latency.observe(duration_secs);
    }

    pub fn record_batch(&self, size: usize) {
        self.batch_size.observe(size as f64);
    }

    /// Render every metric in the Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_render() {
        let metrics = TmMetrics::new().unwrap();
        metrics.record_commit(3, 1, 4);
        metrics.record_stale(2);
        metrics.record_search(0.002);
        metrics.record_rollback();

        let text = metrics.gather_text().unwrap();
        assert!(text.contains("transmem_documents_added_total 3"));
        assert!(text.contains("transmem_domains_deleted_total 1"));
        assert!(text.contains("transmem_stale_events_total 2"));
        assert!(text.contains("transmem_commits_total 1"));
        assert!(text.contains("transmem_rollbacks_total 1"));
        assert!(text.contains("transmem_searches_total 1"));
        assert!(text.contains("transmem_live_documents 4"));
        assert!(text.contains("transmem_search_latency_seconds_count 1"));
    }

    #[test]
    fn test_instances_are_independent() {
        let first = TmMetrics::new().unwrap();
        let second = TmMetrics::new().unwrap();
        first.record_rollback();

        assert_eq!(first.rollbacks.get(), 1.0);
        assert_eq!(second.rollbacks.get(), 0.0);
    }
}
