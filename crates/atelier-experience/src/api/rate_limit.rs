//! Fixed-window rate limiting keyed by client address

use std::net::IpAddr;
use std::time::{Duration, Instant};

use atelier_common::{AtelierError, Result};
use dashmap::DashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Allows `max_requests` per client within each window
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    /// Count one request from `client`
    pub fn check(&self, client: IpAddr) -> Result<()> {
        self.check_at(client, Instant::now())
    }

    /// Count one request from `client` at `now`
    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<()> {
        let mut window = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let remaining = self.window.saturating_sub(elapsed);
            let retry_after_secs = remaining.as_secs().max(1);
            warn!(%client, retry_after_secs, "Rate limit exceeded");
            return Err(AtelierError::RateLimited { retry_after_secs });
        }

        window.count += 1;
        Ok(())
    }

    /// Drop windows that have fully elapsed
    pub fn prune(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}
