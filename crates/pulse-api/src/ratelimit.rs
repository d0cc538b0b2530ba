//! Per-client rate limiting
//!
//! Fixed one-minute windows anchored at each client's first request in
//! the window (not calendar-aligned). The whole map sits behind one
//! mutex; traffic volume does not justify per-key striping. Entries are
//! never evicted and live for the process lifetime.

use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::HeaderValue, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

const WINDOW: i64 = 60; // seconds

/// The public engine-info endpoint tolerates a higher request volume
const PUBLIC_INFO_PATH: &str = "/api/engine/info";
const PUBLIC_INFO_MULTIPLIER: u32 = 3;

struct Entry {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Outcome of one rate-limit check, with everything needed to populate
/// the standard response headers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_unix: i64,
}

/// Shared per-client sliding counter
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Check and count one request from `client_id` against `limit`
    /// requests per minute.
    pub fn allow(&self, client_id: &str, limit: u32) -> Decision {
        self.check(client_id, limit, Utc::now())
    }

    fn check(&self, client_id: &str, limit: u32, now: DateTime<Utc>) -> Decision {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        match entries.get_mut(client_id) {
            Some(entry) if now - entry.window_start <= Duration::seconds(WINDOW) => {
                let reset_unix = (entry.window_start + Duration::seconds(WINDOW)).timestamp();

                if entry.count >= limit {
                    // Rejections do not consume budget
                    return Decision {
                        allowed: false,
                        limit,
                        remaining: 0,
                        reset_unix,
                    };
                }

                entry.count += 1;
                Decision {
                    allowed: true,
                    limit,
                    remaining: limit - entry.count,
                    reset_unix,
                }
            }
            _ => {
                // First request from this client, or its window expired
                entries.insert(
                    client_id.to_string(),
                    Entry { count: 1, window_start: now },
                );
                Decision {
                    allowed: true,
                    limit,
                    remaining: limit.saturating_sub(1),
                    reset_unix: (now + Duration::seconds(WINDOW)).timestamp(),
                }
            }
        }
    }

    /// Number of distinct clients seen so far (no eviction)
    pub fn tracked_clients(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Client identity: forwarded-for chain first, then real-ip, then the
/// socket peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    peer.ip().to_string()
}

/// Axum middleware applying the limiter to every non-exempt route
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    // Health checks bypass the limiter entirely
    if path == "/health" {
        return next.run(request).await;
    }

    let limit = if path == PUBLIC_INFO_PATH {
        state.config.rate_limit_rpm * PUBLIC_INFO_MULTIPLIER
    } else {
        state.config.rate_limit_rpm
    };

    let client = client_ip(request.headers(), peer);
    let decision = state.limiter.allow(&client, limit);

    if !decision.allowed {
        let mut response =
            (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded. Too many requests.")
                .into_response();
        apply_headers(response.headers_mut(), decision);
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: Decision) {
    if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_unix.to_string()) {
        headers.insert("x-ratelimit-reset", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_budget_then_rejects() {
        let limiter = RateLimiter::new();
        let now = Utc::now();

        for i in 0..5u32 {
            let decision = limiter.check("10.0.0.1", 5, now);
            assert!(decision.allowed, "request {i} should pass");
            assert_eq!(decision.remaining, 4 - i);
        }

        let rejected = limiter.check("10.0.0.1", 5, now);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.reset_unix, (now + Duration::seconds(60)).timestamp());

        // A rejection does not consume budget in the next window
        let later = now + Duration::seconds(61);
        assert!(limiter.check("10.0.0.1", 5, later).allowed);
    }

    #[test]
    fn window_resets_after_one_minute() {
        let limiter = RateLimiter::new();
        let now = Utc::now();

        assert!(limiter.check("client", 1, now).allowed);
        assert!(!limiter.check("client", 1, now).allowed);

        let later = now + Duration::seconds(61);
        let decision = limiter.check("client", 1, later);
        assert!(decision.allowed);
        assert_eq!(decision.reset_unix, (later + Duration::seconds(60)).timestamp());
    }

    #[test]
    fn clients_are_independent() {
        let limiter = RateLimiter::new();
        let now = Utc::now();

        assert!(limiter.check("a", 1, now).allowed);
        assert!(!limiter.check("a", 1, now).allowed);
        assert!(limiter.check("b", 1, now).allowed);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn client_ip_prefers_forwarded_chain() {
        let peer: SocketAddr = "192.168.1.9:4000".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.5, 10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers, peer), "203.0.113.5");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.7".parse().unwrap());
        assert_eq!(client_ip(&headers, peer), "198.51.100.7");

        assert_eq!(client_ip(&HeaderMap::new(), peer), "192.168.1.9");
    }
}
