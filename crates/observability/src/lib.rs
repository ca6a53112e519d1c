use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// In-process counters, mirrored to the `metrics` facade so an exporter can
/// be installed by the binary if wanted.
#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    fallback_total: AtomicU64,
    llm_calls_total: AtomicU64,
    llm_failures_total: AtomicU64,
    provider_failures_total: AtomicU64,
    cache_hits_total: AtomicU64,
    cache_misses_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub fallback_total: u64,
    pub llm_calls_total: u64,
    pub llm_failures_total: u64,
    pub provider_failures_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_requests_total").increment(1);
    }

    /// A deterministic estimate stood in for an external answer.
    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_fallback_total").increment(1);
    }

    pub fn inc_llm_call(&self) {
        self.llm_calls_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_llm_calls_total").increment(1);
    }

    pub fn inc_llm_failure(&self) {
        self.llm_failures_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_llm_failures_total").increment(1);
    }

    pub fn inc_provider_failure(&self) {
        self.provider_failures_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_provider_failures_total").increment(1);
    }

    pub fn inc_cache_hit(&self) {
        self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_cache_hits_total").increment(1);
    }

    pub fn inc_cache_miss(&self) {
        self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
        counter!("wayfarer_cache_misses_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            llm_calls_total: self.llm_calls_total.load(Ordering::Relaxed),
            llm_failures_total: self.llm_failures_total.load(Ordering::Relaxed),
            provider_failures_total: self.provider_failures_total.load(Ordering::Relaxed),
            cache_hits_total: self.cache_hits_total.load(Ordering::Relaxed),
            cache_misses_total: self.cache_misses_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,wayfarer_api=info,wayfarer_agents=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
