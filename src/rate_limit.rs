//! # Rate Limiter
//! Per-client request limiting for the search endpoint.
//!
//! One limiter lives in each server's `AppState`; it starts empty and is
//! dropped with the server. A client's counter resets once more than `window`
//! has passed since its last accepted request. Rejected requests leave the
//! client's state untouched. Clients idle for longer than `window` are pruned
//! whenever a new client is admitted, since their next request starts fresh.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use metrics::counter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub limit: u32,
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    last_access: Instant,
    request_count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    inner: Mutex<HashMap<String, ClientWindow>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Accept or reject a request from `client` at the current time.
    pub fn check(&self, client: &str) -> Result<(), RateLimited> {
        self.check_at(client, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock.
    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), RateLimited> {
        let mut map = self.lock();

        let mut state = map.get(client).copied().unwrap_or(ClientWindow {
            last_access: now,
            request_count: 0,
        });
        if now.saturating_duration_since(state.last_access) > self.window {
            state.request_count = 0;
            state.last_access = now;
        }

        if state.request_count >= self.max_requests {
            counter!("rate_limited_total").increment(1);
            tracing::info!(target: "rate_limit", client, limit = self.max_requests, "rate limit exceeded");
            return Err(RateLimited {
                limit: self.max_requests,
            });
        }

        state.request_count += 1;
        state.last_access = now;
        if let Some(slot) = map.get_mut(client) {
            *slot = state;
        } else {
            let window = self.window;
            map.retain(|_, w| now.saturating_duration_since(w.last_access) <= window);
            map.insert(client.to_string(), state);
        }
        Ok(())
    }

    /// Forget every client (server restart).
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ClientWindow>> {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_applies_per_client() {
        let rl = RateLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(rl.check_at("a", t0).is_ok());
        assert!(rl.check_at("a", t0).is_ok());
        assert_eq!(rl.check_at("a", t0), Err(RateLimited { limit: 2 }));
        assert!(rl.check_at("b", t0).is_ok());
    }

    #[test]
    fn idle_longer_than_window_resets() {
        let rl = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(rl.check_at("a", t0).is_ok());
        assert!(rl.check_at("a", t0 + Duration::from_secs(30)).is_err());
        // measured from the last accepted request, not the rejected one
        assert!(rl.check_at("a", t0 + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn exactly_one_window_is_not_enough() {
        let rl = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(rl.check_at("a", t0).is_ok());
        assert!(rl.check_at("a", t0 + Duration::from_secs(60)).is_err());
    }

    #[test]
    fn idle_clients_are_pruned_when_a_new_one_arrives() {
        let rl = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        for i in 0..1_000 {
            assert!(rl.check_at(&format!("10.0.{}.{}", i / 256, i % 256), t0).is_ok());
        }
        assert_eq!(rl.tracked_clients(), 1_000);

        // still inside the window: nobody is dropped
        assert!(rl.check_at("late", t0 + Duration::from_secs(60)).is_ok());
        assert_eq!(rl.tracked_clients(), 1_001);

        assert!(rl.check_at("fresh", t0 + Duration::from_secs(3_600)).is_ok());
        assert_eq!(rl.tracked_clients(), 1);
    }

    #[test]
    fn pruned_client_starts_a_fresh_window() {
        let rl = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(rl.check_at("a", t0).is_ok());
        assert!(rl.check_at("b", t0 + Duration::from_secs(61)).is_ok());
        assert_eq!(rl.tracked_clients(), 1);
        assert!(rl.check_at("a", t0 + Duration::from_secs(62)).is_ok());
        assert!(rl.check_at("a", t0 + Duration::from_secs(63)).is_err());
    }

    #[test]
    fn clear_forgets_clients() {
        let rl = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(rl.check_at("a", t0).is_ok());
        rl.clear();
        assert_eq!(rl.tracked_clients(), 0);
        assert!(rl.check_at("a", t0).is_ok());
    }
}
