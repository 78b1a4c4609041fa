//! Per-key request rate limiting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::config::Settings;

/// Checks between sweeps of idle keys.
const PRUNE_INTERVAL: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Admission check keyed by caller identity (an event id for the assistant).
///
/// An allowed check consumes one slot.
#[async_trait]
pub trait RateLimiter: Send + Sync + std::fmt::Debug {
    async fn check(&self, key: &str) -> RateDecision;
}

/// In-process sliding-window limiter.
///
/// Counts are per process; a multi-instance deployment needs a shared
/// implementation of [`RateLimiter`].
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
    checks: AtomicU64,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            hits: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.rate_limit_requests, settings.rate_limit_window)
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let decision = self.admit_at(key, now);
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_INTERVAL == 0 {
            self.prune_at(now);
        }
        decision
    }

    fn admit_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut hits = self.hits.entry(key.to_string()).or_default();

        while let Some(&oldest) = hits.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        let used = hits.len() as u32;
        if used < self.max_requests {
            hits.push_back(now);
            RateDecision::Allowed {
                remaining: self.max_requests - used - 1,
            }
        } else {
            let retry_after = hits
                .front()
                .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            RateDecision::Limited { retry_after }
        }
    }

    /// Drops keys whose window has fully elapsed.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&self, now: Instant) {
        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|&last| now.saturating_duration_since(last) < self.window)
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }
}
