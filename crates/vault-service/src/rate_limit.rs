//! Sliding-window admission control, keyed by client id.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

/// Window occupancy for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStats {
    pub client_id: String,
    /// Accepted requests still recorded for this client (not pruned until
    /// the next check).
    pub current_requests: usize,
    /// Whether the limiter currently tracks a window for this client.
    pub has_requests: bool,
}

/// Every this many checks, windows with no live request are dropped.
const SWEEP_INTERVAL: usize = 1024;

/// In-process rate limiter. Each client's window is updated under its map
/// entry lock, so concurrent checks for one client are serialized.
///
/// State lives only as long as the limiter; nothing is shared across
/// processes.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    checks: AtomicUsize,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit and record the request if fewer than `limit` requests were
    /// accepted for `client_id` within the trailing `window`.
    pub fn is_allowed(&self, client_id: &str, limit: usize, window: Duration) -> bool {
        self.is_allowed_at(client_id, limit, window, Instant::now())
    }

    fn is_allowed_at(&self, client_id: &str, limit: usize, window: Duration, now: Instant) -> bool {
        let (allowed, idle) = {
            let mut entry = self.windows.entry(client_id.to_string()).or_default();
            let timestamps = entry.value_mut();

            while let Some(oldest) = timestamps.front() {
                if now.duration_since(*oldest) >= window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }

            if timestamps.len() >= limit {
                (false, timestamps.is_empty())
            } else {
                timestamps.push_back(now);
                (true, false)
            }
        };

        // Entry guard must be released before touching the map again.
        if idle {
            self.windows.remove_if(client_id, |_, timestamps| timestamps.is_empty());
        }
        if !allowed {
            debug!(client_id = client_id, limit = limit, "Rate limit exceeded");
        }

        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.prune_idle_at(window, now);
        }
        allowed
    }

    /// Drop every client whose most recent accepted request is older than
    /// `window`.
    fn prune_idle_at(&self, window: Duration, now: Instant) {
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|newest| now.duration_since(*newest) < window)
        });
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed = removed, "Pruned idle rate limit windows");
        }
    }

    pub fn stats(&self, client_id: &str) -> RateLimitStats {
        let current = self.windows.get(client_id).map(|w| w.len());
        RateLimitStats {
            client_id: client_id.to_string(),
            current_requests: current.unwrap_or(0),
            has_requests: current.is_some(),
        }
    }
}
