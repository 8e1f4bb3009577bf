//! Per-client sliding-window request limiting.

use std::{
    collections::{HashMap, VecDeque},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AppError;

const LIMITED_MESSAGE: &str = "Too many requests, please try again later";
static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

/// Remembers the arrival time of each client's requests inside the current
/// window. The lock is never held across an await.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, client: IpAddr, now: Instant) -> Decision {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let arrivals = hits.entry(client).or_default();
        while arrivals
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.window)
        {
            arrivals.pop_front();
        }

        if arrivals.len() >= self.max_requests {
            let oldest = arrivals.front().copied().unwrap_or(now);
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(oldest));
            return Decision::Limited { retry_after };
        }

        arrivals.push_back(now);
        Decision::Allowed {
            remaining: self.max_requests - arrivals.len(),
        }
    }

    /// Forgets clients with no request inside the window. Returns how many
    /// were dropped.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let before = hits.len();
        hits.retain(|_, arrivals| {
            arrivals
                .back()
                .is_some_and(|&t| now.saturating_duration_since(t) < self.window)
        });
        before - hits.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Periodically sweeps idle clients until the runtime shuts down.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = limiter.window().max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.sweep(Instant::now());
            debug!(removed, remaining = limiter.tracked_clients(), "rate limiter swept");
        }
    })
}

fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

/// Requests without a peer address (in-process callers) share one bucket.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    req: Request,
    next: Next,
) -> Response {
    let client = peer
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(client, Instant::now()) {
        Decision::Limited { retry_after } => {
            warn!(%client, uri = %req.uri(), "rate limit exceeded");
            AppError::TooManyRequests {
                message: LIMITED_MESSAGE,
                retry_after_secs: retry_after_secs(retry_after),
            }
            .into_response()
        }
        Decision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(
                RATELIMIT_LIMIT.clone(),
                HeaderValue::from(limiter.max_requests),
            );
            headers.insert(RATELIMIT_REMAINING.clone(), HeaderValue::from(remaining));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert_eq!(limiter.check(ip(1), now), Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.check(ip(1), now), Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.check(ip(1), now), Decision::Allowed { remaining: 0 });
        assert_eq!(
            limiter.check(ip(1), now),
            Decision::Limited {
                retry_after: Duration::from_secs(60)
            }
        );
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(matches!(limiter.check(ip(1), now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check(ip(2), now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check(ip(1), now), Decision::Limited { .. }));
    }

    #[test]
    fn window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();
        limiter.check(ip(1), start);
        limiter.check(ip(1), start + Duration::from_secs(5));
        assert_eq!(
            limiter.check(ip(1), start + Duration::from_secs(8)),
            Decision::Limited {
                retry_after: Duration::from_secs(2)
            }
        );
        // The first hit has aged out; the second still counts.
        assert_eq!(
            limiter.check(ip(1), start + Duration::from_secs(10)),
            Decision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn sweep_drops_idle_clients() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();
        limiter.check(ip(1), start);
        limiter.check(ip(2), start + Duration::from_secs(8));

        assert_eq!(limiter.sweep(start + Duration::from_secs(12)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::from_secs(3)), 3);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }
}
