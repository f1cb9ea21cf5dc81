//! Span helpers for the refresh pipeline

/// Span around one refresh cycle.
///
/// ```rust
/// let span = telesync_observability::refresh_span!(42_i64, "a1b2c3d4");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! refresh_span {
    ($conversation:expr, $cycle:expr) => {
        tracing::info_span!(
            "refresh.cycle",
            conversation = $conversation,
            cycle = $cycle,
            pages = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around a snapshot request crossing into the directory runtime.
#[macro_export]
macro_rules! bridge_span {
    ($timeout_ms:expr) => {
        tracing::debug_span!(
            "bridge.request_snapshot",
            timeout_ms = $timeout_ms,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around a call to an external platform (Discord or Telegram).
#[macro_export]
macro_rules! platform_span {
    ($platform:expr, $operation:expr) => {
        tracing::debug_span!(
            "platform.call",
            platform = $platform,
            operation = $operation,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span and log it at warn level.
pub fn record_error<E: std::fmt::Display>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::warn!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
