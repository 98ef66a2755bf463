//! Shared application state for the TrialStat server.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared state available to all request handlers.
pub struct AppState {
    /// Server start time (for uptime reporting).
    pub started_at: Instant,

    /// Upper bound on the wall time of one analysis request.
    pub analysis_timeout: Duration,

    /// In-flight analyses (for /health).
    pub inflight: AtomicU64,

    /// Total analyses requested (for /health).
    pub total_requests: AtomicU64,

    /// Analyses abandoned after `analysis_timeout` (for /health).
    pub timed_out: AtomicU64,
}

impl AppState {
    pub fn new(analysis_timeout: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            analysis_timeout,
            inflight: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
        }
    }
}

/// Type alias used in axum handlers.
pub type SharedState = Arc<AppState>;
