use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time snapshot of the service counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Number of shares created
    pub creates: usize,
    /// Number of shares updated
    pub updates: usize,
    /// Number of shares loaded
    pub loads: usize,
    /// Number of loads served from a link-embedded payload
    pub fallback_loads: usize,
    /// Number of shares deleted
    pub deletes: usize,
    /// Number of entries removed by cleanup
    pub cleanup_removed: usize,
    /// Number of contained tier failures
    pub tier_errors: usize,
}

/// Operation metrics collector for the share service
#[derive(Debug)]
pub struct MetricsCollector {
    // Operation counts
    /// Number of create operations
    create_count: AtomicUsize,
    /// Number of update operations
    update_count: AtomicUsize,
    /// Number of load operations that returned content
    load_count: AtomicUsize,
    /// Number of loads served from a link-embedded payload
    fallback_count: AtomicUsize,
    /// Number of delete operations
    delete_count: AtomicUsize,

    // Retention metrics
    /// Number of entries removed by cleanup
    cleanup_removed: AtomicUsize,

    // Failure metrics
    /// Number of tier failures that were contained rather than escalated
    tier_error_count: AtomicUsize,

    // Internal state
    /// Start time of the metrics collector
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            create_count: AtomicUsize::new(0),
            update_count: AtomicUsize::new(0),
            load_count: AtomicUsize::new(0),
            fallback_count: AtomicUsize::new(0),
            delete_count: AtomicUsize::new(0),
            cleanup_removed: AtomicUsize::new(0),
            tier_error_count: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Increment create count
    pub fn increment_creates(&self) {
        self.create_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment update count
    pub fn increment_updates(&self) {
        self.update_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment load count
    pub fn increment_loads(&self) {
        self.load_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment fallback load count
    pub fn increment_fallback_loads(&self) {
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment delete count
    pub fn increment_deletes(&self) {
        self.delete_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Add entries removed by a cleanup pass
    pub fn add_cleanup_removed(&self, count: usize) {
        self.cleanup_removed.fetch_add(count, Ordering::Relaxed);
    }

    /// Increment contained tier failure count
    pub fn increment_tier_errors(&self) {
        self.tier_error_count.fetch_add(1, Ordering::Relaxed);
    }

    // Getters

    /// Get number of create operations
    pub fn get_create_count(&self) -> usize {
        self.create_count.load(Ordering::Relaxed)
    }

    /// Get number of update operations
    pub fn get_update_count(&self) -> usize {
        self.update_count.load(Ordering::Relaxed)
    }

    /// Get number of load operations
    pub fn get_load_count(&self) -> usize {
        self.load_count.load(Ordering::Relaxed)
    }

    /// Get number of fallback loads
    pub fn get_fallback_count(&self) -> usize {
        self.fallback_count.load(Ordering::Relaxed)
    }

    /// Get number of delete operations
    pub fn get_delete_count(&self) -> usize {
        self.delete_count.load(Ordering::Relaxed)
    }

    /// Get number of entries removed by cleanup
    pub fn get_cleanup_removed(&self) -> usize {
        self.cleanup_removed.load(Ordering::Relaxed)
    }

    /// Get number of contained tier failures
    pub fn get_tier_error_count(&self) -> usize {
        self.tier_error_count.load(Ordering::Relaxed)
    }

    /// Get uptime of the metrics collector
    pub fn get_uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Take a snapshot of all counters
    pub fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            creates: self.get_create_count(),
            updates: self.get_update_count(),
            loads: self.get_load_count(),
            fallback_loads: self.get_fallback_count(),
            deletes: self.get_delete_count(),
            cleanup_removed: self.get_cleanup_removed(),
            tier_errors: self.get_tier_error_count(),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.create_count.store(0, Ordering::Relaxed);
        self.update_count.store(0, Ordering::Relaxed);
        self.load_count.store(0, Ordering::Relaxed);
        self.fallback_count.store(0, Ordering::Relaxed);
        self.delete_count.store(0, Ordering::Relaxed);
        self.cleanup_removed.store(0, Ordering::Relaxed);
        self.tier_error_count.store(0, Ordering::Relaxed);
    }

    /// Get a report of all metrics
    pub fn get_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Amber Metrics Report ===\n\n");

        report.push_str(&format!("Uptime: {:?}\n\n", self.get_uptime()));

        report.push_str("Operation Counts:\n");
        report.push_str(&format!("  Creates: {}\n", self.get_create_count()));
        report.push_str(&format!("  Updates: {}\n", self.get_update_count()));
        report.push_str(&format!("  Loads: {}\n", self.get_load_count()));
        report.push_str(&format!(
            "  Fallback Loads: {}\n",
            self.get_fallback_count()
        ));
        report.push_str(&format!("  Deletes: {}\n\n", self.get_delete_count()));

        report.push_str("Retention:\n");
        report.push_str(&format!(
            "  Cleanup Removed: {}\n\n",
            self.get_cleanup_removed()
        ));

        report.push_str("Failures:\n");
        report.push_str(&format!(
            "  Contained Tier Errors: {}\n",
            self.get_tier_error_count()
        ));

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_basic_recording() {
        let metrics = MetricsCollector::new();

        metrics.increment_creates();
        metrics.increment_updates();
        metrics.increment_loads();
        metrics.increment_fallback_loads();
        metrics.increment_deletes();
        metrics.add_cleanup_removed(3);
        metrics.increment_tier_errors();

        assert_eq!(metrics.get_create_count(), 1);
        assert_eq!(metrics.get_update_count(), 1);
        assert_eq!(metrics.get_load_count(), 1);
        assert_eq!(metrics.get_fallback_count(), 1);
        assert_eq!(metrics.get_delete_count(), 1);
        assert_eq!(metrics.get_cleanup_removed(), 3);
        assert_eq!(metrics.get_tier_error_count(), 1);
    }

    #[test]
    fn test_metrics_snapshot_and_reset() {
        let metrics = MetricsCollector::new();

        metrics.increment_creates();
        metrics.increment_creates();
        metrics.add_cleanup_removed(5);

        let stats = metrics.snapshot();
        assert_eq!(stats.creates, 2);
        assert_eq!(stats.cleanup_removed, 5);
        assert_eq!(stats.tier_errors, 0);

        metrics.reset();
        assert_eq!(metrics.snapshot(), ServiceStats::default());
    }

    #[test]
    fn test_metrics_report() {
        let metrics = MetricsCollector::new();

        metrics.increment_creates();
        metrics.increment_tier_errors();

        let report = metrics.get_report();
        assert!(report.contains("Operation Counts:"));
        assert!(report.contains("Creates: 1"));
        assert!(report.contains("Contained Tier Errors: 1"));
    }

    #[test]
    fn test_metrics_thread_safety() {
        let metrics = Arc::new(MetricsCollector::new());

        let mut handles = Vec::new();
        for _ in 0..10 {
            let metrics_clone = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    metrics_clone.increment_loads();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.get_load_count(), 1000);
    }
}
