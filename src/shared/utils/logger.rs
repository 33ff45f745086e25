use std::sync::Once;
use std::time::Instant;
use tracing::{debug, info, warn, Level};

static INIT: Once = Once::new();

/// Environment variable holding the log level (`error`, `warn`, `info`, `debug`, `trace`)
pub const LOG_LEVEL_ENV: &str = "CARDSEARCH_LOG";

/// Initialize the logging system
/// This should be called once at application startup
pub fn init_logger() {
    INIT.call_once(|| {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|raw| parse_level(&raw))
            .unwrap_or(Level::INFO);

        let result = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init();

        match result {
            Ok(()) => info!("Logging system initialized at {}", level),
            // A subscriber installed by the host (or a test harness) wins
            Err(e) => eprintln!("Logger already installed: {}", e),
        }
    });
}

fn parse_level(raw: &str) -> Option<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Structured logging helpers for common patterns
pub struct LogContext;

impl LogContext {
    /// Log API calls
    pub fn api_call(provider: &str, endpoint: &str, status: &str, duration_ms: Option<u64>) {
        match duration_ms {
            Some(duration) => debug!(
                "API: {} {} {} in {}ms",
                provider, endpoint, status, duration
            ),
            None => debug!("API: Starting {} {}", provider, endpoint),
        }
    }

    /// Log search operations
    pub fn search_operation(query: &str, source: Option<&str>, results: Option<usize>) {
        match (source, results) {
            (Some(s), Some(r)) => info!("Search: '{}' via {} returned {} results", query, s, r),
            (Some(s), None) => debug!("Search: Starting '{}' via {}", query, s),
            (None, Some(r)) => info!("Search: '{}' returned {} results", query, r),
            (None, None) => debug!("Search: Starting '{}'", query),
        }
    }

    /// Log a degraded result (fallback taken after a failure)
    pub fn degraded(context: &str, error: &dyn std::error::Error) {
        warn!("{}: {}", context, error);
    }

    /// Log performance metrics
    pub fn performance_metric(operation: &str, duration_ms: u64, additional_info: Option<&str>) {
        match additional_info {
            Some(extra) => debug!(
                "Performance: {} took {}ms ({})",
                operation, duration_ms, extra
            ),
            None => debug!("Performance: {} took {}ms", operation, duration_ms),
        }
    }
}

/// Helper for timing operations
pub struct TimedOperation {
    start: Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting: {}", operation);
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish(self) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, None);
        duration
    }

    pub fn finish_with_info(self, info: &str) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, Some(info));
        duration
    }
}
