//! Prometheus metrics for token issuance.

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_ticket_tokens_issued_total",
        "Total number of token tickets issued",
        &["mode"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Rejected build and parse operations.
pub static TOKENS_REJECTED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_ticket_tokens_rejected_total",
        "Total number of token ticket operations that failed",
        &["operation", "reason"]
    )
    .expect("Failed to register tokens_rejected metric")
});

/// Auto-enabled cryptography counter.
pub static CRYPTO_AUTO_ENABLED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "token_ticket_crypto_auto_enabled_total",
        "Times token cryptography was enabled because keys were present"
    )
    .expect("Failed to register crypto_auto_enabled metric")
});

/// Record a token issuance.
pub fn record_token_issued(mode: &str) {
    TOKENS_ISSUED.with_label_values(&[mode]).inc();
}

/// Record a failed build or parse.
pub fn record_token_rejected(operation: &str, reason: &str) {
    TOKENS_REJECTED
        .with_label_values(&[operation, reason])
        .inc();
}

/// Record an auto-enable decision.
pub fn record_crypto_auto_enabled() {
    CRYPTO_AUTO_ENABLED.inc();
}
