//! # Application State Management
//!
//! State shared by every HTTP request handler: the effective configuration,
//! the operator (with its collaborator clients) and the metrics counters.
//!
//! ## Sharing Pattern:
//! - **Arc**: handlers on every worker thread hold a reference to the same data
//! - **RwLock**: metrics are updated by every request, so they sit behind a lock
//! - The configuration and the operator never change after startup, so a plain
//!   `Arc` is enough for them

use crate::config::AppConfig;
use crate::operator::WordFrequencyStep;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

/// The main application state, cloned into each actix worker.
#[derive(Clone)]
pub struct AppState {
    /// Configuration the service was started with
    pub config: Arc<AppConfig>,

    /// The word-frequency operator and its clients
    pub step: Arc<WordFrequencyStep>,

    /// Request and operator counters
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// When the server started
    pub start_time: Instant,
}

/// Counters collected across all requests.
#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    /// Total number of HTTP requests processed since server start
    pub request_count: u64,

    /// Total number of 4xx/5xx responses since server start
    pub error_count: u64,

    /// Per-endpoint statistics, keyed by `"METHOD /pattern"`
    pub endpoint_metrics: HashMap<String, EndpointMetric>,

    /// Operator invocation outcomes
    pub operator: OperatorMetrics,
}

/// Per-endpoint request statistics.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

/// Operator invocation statistics.
///
/// ## Fields:
/// - **invocations**: every run, successful or not
/// - **failures_by_kind**: failures keyed by error kind (`fetch_error`, ...)
/// - **words_counted**: tokens counted across all successful runs
#[derive(Debug, Default, Clone)]
pub struct OperatorMetrics {
    pub invocations: u64,
    pub completed: u64,
    pub failed: u64,
    pub failures_by_kind: HashMap<&'static str, u64>,
    pub words_counted: u64,
    pub total_duration_ms: u64,
}

impl AppState {
    pub fn new(config: AppConfig, step: WordFrequencyStep) -> Self {
        Self {
            config: Arc::new(config),
            step: Arc::new(step),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
        }
    }

    /// Record one HTTP request (called by the request metrics wrapper).
    ///
    /// A poisoned lock only means another request panicked mid-update; the
    /// counters are still usable, so the guard is recovered instead of failing.
    pub fn record_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);

        metrics.request_count += 1;
        if is_error {
            metrics.error_count += 1;
        }

        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();
        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;
        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Record a successful operator run.
    pub fn record_operator_success(&self, words_counted: u64, duration_ms: u64) {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        let operator = &mut metrics.operator;
        operator.invocations += 1;
        operator.completed += 1;
        operator.words_counted += words_counted;
        operator.total_duration_ms += duration_ms;
    }

    /// Record a failed operator run.
    pub fn record_operator_failure(&self, kind: &'static str, duration_ms: u64) {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        let operator = &mut metrics.operator;
        operator.invocations += 1;
        operator.failed += 1;
        operator.total_duration_ms += duration_ms;
        *operator.failures_by_kind.entry(kind).or_insert(0) += 1;
    }

    /// Consistent copy of the current metrics, taken under a read lock.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that failed (0.0 to 1.0).
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}

impl OperatorMetrics {
    /// Fraction of invocations that completed (0.0 to 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.invocations > 0 {
            self.completed as f64 / self.invocations as f64
        } else {
            0.0
        }
    }

    pub fn average_duration_ms(&self) -> f64 {
        if self.invocations > 0 {
            self.total_duration_ms as f64 / self.invocations as f64
        } else {
            0.0
        }
    }
}
