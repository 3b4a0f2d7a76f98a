//! Failed reCAPTCHA attempt tracking.
//!
//! Each client key gets a fixed window that starts at its first failure.
//! Later failures inside the window only bump the counter; the window never
//! slides. A key is blocked while its counter is at or above the maximum.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::config::ReCaptchaSettings;

#[derive(Debug, Clone, Copy)]
struct AttemptWindow {
    started_at: Instant,
    attempts: u32,
}

impl AttemptWindow {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.started_at) >= ttl
    }
}

/// In-memory, bounded attempt counter keyed by client (usually the IP).
pub struct ReCaptchaAttemptService {
    windows: DashMap<String, AttemptWindow>,
    max_attempts: u32,
    ttl: Duration,
    capacity: usize,
}

impl ReCaptchaAttemptService {
    pub fn new(max_attempts: u32, ttl: Duration, capacity: usize) -> Self {
        Self {
            windows: DashMap::new(),
            max_attempts,
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn from_settings(settings: &ReCaptchaSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.attempt_ttl_secs),
            settings.max_tracked_clients,
        )
    }

    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    pub fn record_success(&self, key: &str) {
        self.windows.remove(key);
    }

    pub fn is_blocked(&self, key: &str) -> bool {
        self.is_blocked_at(key, Instant::now())
    }

    /// Attempts counted for `key` in its current window.
    pub fn attempts(&self, key: &str) -> u32 {
        self.attempts_at(key, Instant::now())
    }

    fn attempts_at(&self, key: &str, now: Instant) -> u32 {
        self.windows
            .get(key)
            .filter(|w| !w.is_expired(now, self.ttl))
            .map(|w| w.attempts)
            .unwrap_or(0)
    }

    fn is_blocked_at(&self, key: &str, now: Instant) -> bool {
        self.attempts_at(key, now) >= self.max_attempts
    }

    fn record_failure_at(&self, key: &str, now: Instant) {
        if !self.windows.contains_key(key) && self.windows.len() >= self.capacity {
            self.evict(now);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(AttemptWindow {
            started_at: now,
            attempts: 0,
        });
        if entry.is_expired(now, self.ttl) {
            *entry = AttemptWindow {
                started_at: now,
                attempts: 0,
            };
        }
        entry.attempts += 1;
        debug!(key, attempts = entry.attempts, "Recorded failed reCAPTCHA attempt");
    }

    /// Drop expired windows; if still full, drop the oldest one.
    fn evict(&self, now: Instant) {
        self.windows.retain(|_, w| !w.is_expired(now, self.ttl));
        if self.windows.len() < self.capacity {
            return;
        }

        let oldest = self
            .windows
            .iter()
            .min_by_key(|entry| entry.value().started_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.windows.remove(&key);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn service() -> ReCaptchaAttemptService {
        ReCaptchaAttemptService::new(4, 4 * HOUR, 3)
    }

    #[test]
    fn test_blocks_after_max_attempts() {
        let service = service();
        let now = Instant::now();
        for _ in 0..3 {
            service.record_failure_at("10.0.0.1", now);
        }
        assert!(!service.is_blocked_at("10.0.0.1", now));

        service.record_failure_at("10.0.0.1", now);
        assert!(service.is_blocked_at("10.0.0.1", now));
    }

    #[test]
    fn test_window_is_fixed_from_first_failure() {
        let service = service();
        let start = Instant::now();
        for i in 0..4 {
            service.record_failure_at("10.0.0.1", start + Duration::from_secs(i * 3600));
        }
        // Last failure was at +3h; the window still ends at +4h from the first
        assert!(service.is_blocked_at("10.0.0.1", start + 3 * HOUR + Duration::from_secs(1800)));
        assert!(!service.is_blocked_at("10.0.0.1", start + 4 * HOUR));
    }

    #[test]
    fn test_expired_window_restarts_count() {
        let service = service();
        let start = Instant::now();
        for _ in 0..4 {
            service.record_failure_at("10.0.0.1", start);
        }
        service.record_failure_at("10.0.0.1", start + 5 * HOUR);
        assert_eq!(service.attempts_at("10.0.0.1", start + 5 * HOUR), 1);
    }

    #[test]
    fn test_success_clears_attempts() {
        let service = service();
        for _ in 0..4 {
            service.record_failure("10.0.0.2");
        }
        assert!(service.is_blocked("10.0.0.2"));

        service.record_success("10.0.0.2");
        assert!(!service.is_blocked("10.0.0.2"));
        assert_eq!(service.attempts("10.0.0.2"), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest_window() {
        let service = service();
        let start = Instant::now();
        service.record_failure_at("a", start);
        service.record_failure_at("b", start + Duration::from_secs(1));
        service.record_failure_at("c", start + Duration::from_secs(2));
        service.record_failure_at("d", start + Duration::from_secs(3));

        assert_eq!(service.tracked(), 3);
        assert_eq!(service.attempts_at("a", start + Duration::from_secs(3)), 0);
        assert_eq!(service.attempts_at("d", start + Duration::from_secs(3)), 1);
    }
}
