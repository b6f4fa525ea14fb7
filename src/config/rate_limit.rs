use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later";

/// Fixed-window request counter keyed by client IP. The sole admission
/// control the application imposes; everything else is delegated to the
/// transport.
#[derive(Clone)]
pub struct RateLimiter {
    shared: Arc<Mutex<Shared>>,
    max: u32,
    window: Duration,
}

struct Shared {
    windows: HashMap<IpAddr, Window>,
    /// Expired entries are swept at most once per window so a scan from
    /// many source addresses cannot grow the map without bound.
    last_sweep: Instant,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max,
            window,
        }
    }

    pub fn allow(&self, ip: IpAddr) -> bool {
        self.allow_at(ip, Instant::now())
    }

    fn allow_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());

        if now.duration_since(shared.last_sweep) >= self.window {
            let window = self.window;
            shared
                .windows
                .retain(|_, entry| now.duration_since(entry.started) < window);
            shared.last_sweep = now;
        }

        let entry = shared.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max {
            return false;
        }
        entry.count += 1;
        true
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.shared
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .windows
            .len()
    }
}

pub async fn limit_requests(
    State(limiter): State<RateLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.allow(addr.ip()) {
        tracing::warn!(ip = %addr.ip(), "Rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn test_allows_up_to_max_within_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.allow_at(ip(1), now));
        assert!(limiter.allow_at(ip(1), now));
        assert!(limiter.allow_at(ip(1), now));
        assert!(!limiter.allow_at(ip(1), now));
    }

    #[test]
    fn test_counts_are_per_ip() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.allow_at(ip(1), now));
        assert!(limiter.allow_at(ip(2), now));
        assert!(!limiter.allow_at(ip(1), now));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.allow_at(ip(1), now));
        assert!(!limiter.allow_at(ip(1), now));
        assert!(limiter.allow_at(ip(1), now + Duration::from_secs(61)));
    }

    #[test]
    fn test_stale_entries_are_evicted() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        // A burst of one-shot addresses that never return.
        for last in 1..=200u8 {
            assert!(limiter.allow_at(IpAddr::from([10, 0, 0, last]), now));
        }
        assert_eq!(limiter.tracked_ips(), 200);

        // Long after their windows expired, the next request sweeps them.
        assert!(limiter.allow_at(ip(1), now + Duration::from_secs(3600)));
        assert_eq!(limiter.tracked_ips(), 1);
    }

    #[test]
    fn test_sweep_keeps_live_windows() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.allow_at(ip(1), now));
        // The +100s request sweeps ip(1) away and starts a fresh window.
        assert!(limiter.allow_at(ip(2), now + Duration::from_secs(100)));
        assert!(limiter.allow_at(ip(3), now + Duration::from_secs(130)));
        // The +161s sweep drops ip(2) (expired) but keeps ip(3) (live).
        assert!(limiter.allow_at(ip(4), now + Duration::from_secs(161)));
        assert_eq!(limiter.tracked_ips(), 2);
        // ip(3)'s surviving count is intact: one more request fits, the
        // next does not.
        assert!(limiter.allow_at(ip(3), now + Duration::from_secs(161)));
        assert!(!limiter.allow_at(ip(3), now + Duration::from_secs(162)));
    }
}
