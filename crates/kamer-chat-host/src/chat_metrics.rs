use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct ChatMetrics {
    pub requests: AtomicU64,
    pub bad_requests: AtomicU64,
    pub internal_errors: AtomicU64,
    pub cultures_detected: AtomicU64,
    pub general_fallbacks: AtomicU64,
    pub translation_attempts: AtomicU64,
    pub translation_failures: AtomicU64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChatMetricsSnapshot {
    pub requests: u64,
    pub bad_requests: u64,
    pub internal_errors: u64,
    pub cultures_detected: u64,
    pub general_fallbacks: u64,
    pub translation_attempts: u64,
    pub translation_failures: u64,
}

impl ChatMetrics {
    pub fn snapshot(&self) -> ChatMetricsSnapshot {
        ChatMetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            bad_requests: self.bad_requests.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
            cultures_detected: self.cultures_detected.load(Ordering::Relaxed),
            general_fallbacks: self.general_fallbacks.load(Ordering::Relaxed),
            translation_attempts: self.translation_attempts.load(Ordering::Relaxed),
            translation_failures: self.translation_failures.load(Ordering::Relaxed),
        }
    }
}
