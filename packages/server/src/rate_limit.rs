//! Sliding-window request limits keyed by client address.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

/// One hour, the window every limit in this server uses.
pub const WINDOW: Duration = Duration::from_secs(3600);

/// Requests per window for ordinary endpoints.
pub const DEFAULT_LIMIT: u32 = 100;
/// Requests per window for AI endpoints.
pub const AI_LIMIT: u32 = 20;
/// Requests per window for report export.
pub const EXPORT_LIMIT: u32 = 10;

/// A request that exceeded its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exceeded {
    /// Requests allowed per window.
    pub limit: u32,
    /// Time until the oldest counted request leaves the window.
    pub retry_after: Duration,
}

/// Counts requests per client over a sliding window.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Allows `limit` requests per client in any `window`.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Requests allowed per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Records a request from `client` if it is within the limit.
    ///
    /// # Errors
    ///
    /// Returns [`Exceeded`] if `client` has used up its window; the
    /// rejected request is not counted.
    pub fn check(&self, client: &str) -> Result<(), Exceeded> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<(), Exceeded> {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let window = hits.entry(client.to_string()).or_default();

        while window
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            window.pop_front();
        }

        if window.len() >= self.limit as usize {
            let oldest = window.front().copied().unwrap_or(now);
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(oldest));
            log::warn!("Rate limit of {} exceeded by {client}", self.limit);
            return Err(Exceeded {
                limit: self.limit,
                retry_after,
            });
        }

        window.push_back(now);
        Ok(())
    }
}

/// The three limits the server applies.
#[derive(Debug)]
pub struct RateLimiters {
    /// Ordinary data endpoints.
    pub default: RateLimiter,
    /// AI narrative endpoints.
    pub ai: RateLimiter,
    /// Report export.
    pub export: RateLimiter,
}

impl RateLimiters {
    /// Standard limits with a configurable default.
    #[must_use]
    pub fn new(default_limit: u32) -> Self {
        Self {
            default: RateLimiter::new(default_limit, WINDOW),
            ai: RateLimiter::new(AI_LIMIT, WINDOW),
            export: RateLimiter::new(EXPORT_LIMIT, WINDOW),
        }
    }
}

impl Default for RateLimiters {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}
