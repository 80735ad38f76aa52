//! Fixed-window rate limiting for the public write endpoints.
//!
//! Clients are keyed by IP. The number of tracked keys is capped so a flood of
//! distinct addresses cannot grow the map without bound: a full map first drops
//! expired windows, then the window that started earliest.

mod middleware;

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use rustc_hash::FxHashMap;

pub(crate) use middleware::handler;

/// Limits applied per client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,

    /// Maximum number of keys tracked at once.
    pub capacity: usize,

    pub trust_forwarded_for: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            capacity: 10_000,
            trust_forwarded_for: false,
        }
    }
}

/// Result of [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub(crate) struct RateLimiter {
    settings: RateLimitSettings,
    windows: Mutex<FxHashMap<String, Window>>,
}

impl RateLimiter {
    #[must_use]
    pub(crate) fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings: RateLimitSettings {
                capacity: settings.capacity.max(1),
                ..settings
            },
            windows: Mutex::new(FxHashMap::default()),
        }
    }

    pub(crate) fn trusts_forwarded_for(&self) -> bool {
        self.settings.trust_forwarded_for
    }

    /// Count a request from `key` at `now`.
    pub(crate) fn check(&self, key: &str, now: Instant) -> RateDecision {
        let RateLimitSettings {
            max_requests,
            window,
            capacity,
            ..
        } = self.settings;

        if max_requests == 0 {
            return RateDecision::Limited {
                retry_after: window,
            };
        }

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = windows.get_mut(key) {
            let elapsed = now.saturating_duration_since(current.started);

            if elapsed >= window {
                *current = Window {
                    started: now,
                    count: 1,
                };

                return RateDecision::Allowed {
                    remaining: max_requests - 1,
                };
            }

            if current.count >= max_requests {
                return RateDecision::Limited {
                    retry_after: window - elapsed,
                };
            }

            current.count += 1;

            return RateDecision::Allowed {
                remaining: max_requests - current.count,
            };
        }

        if windows.len() >= capacity {
            evict(&mut windows, now, window, capacity);
        }

        windows.insert(
            key.to_string(),
            Window {
                started: now,
                count: 1,
            },
        );

        RateDecision::Allowed {
            remaining: max_requests - 1,
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitSettings::default())
    }
}

fn evict(
    windows: &mut FxHashMap<String, Window>,
    now: Instant,
    window: Duration,
    capacity: usize,
) {
    windows.retain(|_, current| now.saturating_duration_since(current.started) < window);

    if windows.len() < capacity {
        return;
    }

    let oldest = windows
        .iter()
        .min_by_key(|(_, current)| current.started)
        .map(|(key, _)| key.clone());

    if let Some(oldest) = oldest {
        windows.remove(&oldest);
    }
}
