//! Per-IP WebSocket connection rate limiting
//!
//! Follows the gateway's `synapse-server::rate_limit` shape (a shared
//! counter keyed by client identity, consulted before the handler runs)
//! generalized from HTTP request counting to WS connection counting, since
//! that is the only surface this system's spec asks to be rate-limited.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

const WINDOW: Duration = Duration::from_secs(60);
const MAX_CONNECTIONS_PER_WINDOW: usize = 10;
const BLOCK_DURATION: Duration = Duration::from_secs(5 * 60);

struct Entry {
    attempts: Vec<Instant>,
    blocked_until: Option<Instant>,
}

/// Tracks recent WebSocket connection attempts per source IP
#[derive(Default)]
pub struct ConnectionLimiter {
    entries: DashMap<IpAddr, Entry>,
}

impl ConnectionLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connection attempt from `ip`, returning `true` if it is allowed
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self.entries.entry(ip).or_insert_with(|| Entry { attempts: Vec::new(), blocked_until: None });

        if let Some(until) = entry.blocked_until {
            if now < until {
                return false;
            }
            entry.blocked_until = None;
            entry.attempts.clear();
        }

        entry.attempts.retain(|t| now.duration_since(*t) < WINDOW);
        entry.attempts.push(now);

        if entry.attempts.len() > MAX_CONNECTIONS_PER_WINDOW {
            entry.blocked_until = Some(now + BLOCK_DURATION);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_exceeding_the_window_limit() {
        let limiter = ConnectionLimiter::new();
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        for _ in 0..MAX_CONNECTIONS_PER_WINDOW {
            assert!(limiter.check(ip));
        }
        assert!(!limiter.check(ip));
    }

    #[test]
    fn distinct_ips_are_tracked_independently() {
        let limiter = ConnectionLimiter::new();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        for _ in 0..MAX_CONNECTIONS_PER_WINDOW {
            assert!(limiter.check(a));
        }
        assert!(limiter.check(b));
    }
}
