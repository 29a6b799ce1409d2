//! OpenTelemetry span helpers for network binding operations
//!
//! Span names are static (`network_bindings.*`) and attributes are structured
//! fields, so traces group by operation rather than by argument values. The
//! `error.*` and `otel.status_code` fields start empty and are filled by
//! [`record_error`] when the operation fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use network_bindings::spans;
//! use alloy_primitives::Address;
//!
//! let span = spans::query_events(Address::ZERO, "MinDelayChange", Some(100), None);
//! let _guard = span.enter();
//! // Your custom log query here
//! ```

use alloy_primitives::Address;
use tracing::Span;

/// Create span for a one-shot event query.
///
/// `to_block` is recorded once the head is known when the filter leaves the
/// upper bound open.
///
/// Parent: Caller's span
/// Children: Provider RPC calls, one per chunk
#[inline]
pub fn query_events(
    contract_address: Address,
    event_name: &str,
    from_block: Option<u64>,
    to_block: Option<u64>,
) -> Span {
    tracing::info_span!(
        "network_bindings.query_events",
        contract_address = %contract_address,
        event_name = event_name,
        from_block = from_block,
        to_block = to_block,
        chunks = tracing::field::Empty,
        log_count = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span covering the lifetime of an event watch stream.
///
/// Parent: Caller's span
/// Children: network_bindings.poll_events (one per poll)
#[inline]
pub fn watch_events(contract_address: Address, event_name: &str, poll_interval_ms: u64) -> Span {
    tracing::info_span!(
        "network_bindings.watch_events",
        contract_address = %contract_address,
        event_name = event_name,
        poll_interval_ms = poll_interval_ms,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a single watcher poll.
///
/// `from_block` is the watcher's cursor when the poll starts; the range end is
/// recorded once the head is known.
#[inline]
pub fn poll_events(contract_address: Address, from_block: Option<u64>) -> Span {
    tracing::debug_span!(
        "network_bindings.poll_events",
        contract_address = %contract_address,
        from_block = from_block,
        to_block = tracing::field::Empty,
        head_block = tracing::field::Empty,
        log_count = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a read-only contract call (`eth_call`).
///
/// Parent: Caller's span
/// Children: Provider RPC calls (from alloy instrumentation)
#[inline]
pub fn contract_call(contract: &str, contract_address: Address, method: &str) -> Span {
    tracing::debug_span!(
        "network_bindings.contract_call",
        contract = contract,
        contract_address = %contract_address,
        method = method,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for decoding revert data against a contract's errors.
#[inline]
pub fn decode_revert(contract: &str, data_len: usize) -> Span {
    tracing::debug_span!(
        "network_bindings.decode_revert",
        contract = contract,
        data_len = data_len,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// Sets `error.type` to the text before the first colon of the error's
/// message, `error.message` to the full message and `otel.status_code` to
/// `ERROR`.
///
/// # Example
///
/// ```rust,no_run
/// use network_bindings::{spans, decode_revert};
///
/// let span = spans::decode_revert("INetwork", 3);
/// let _guard = span.enter();
///
/// if let Err(e) = decode_revert(&[0x9b, 0x4c, 0x49]) {
///     spans::record_error(&e);
/// }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}

/// Record error attributes with an explicit type and optional context.
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.source", context);
    }
}
