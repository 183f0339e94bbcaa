//! Sliding-window rate limiting, per client and per endpoint.
//!
//! Each `ClientKey` owns a log of the instants at which its requests were
//! admitted. A check prunes everything that has fallen out of the trailing
//! window and admits the request only if fewer than `limit` entries remain.

use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RouteLimit;
use crate::observability::metrics;

/// Rate-limit bucket identity: client plus endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(identity: &str, endpoint: &str) -> Self {
        Self(format!("{}:{}", identity, endpoint))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Admitted requests inside the window, including this one if allowed.
    pub current: usize,
    pub limit: usize,
}

impl Decision {
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.current)
    }
}

struct RequestLog {
    hits: VecDeque<Instant>,
    window: Duration,
}

impl RequestLog {
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    fn is_idle(&self, now: Instant) -> bool {
        match self.hits.back() {
            Some(&newest) => now.saturating_duration_since(newest) >= self.window,
            None => true,
        }
    }
}

/// In-memory sliding-window limiter shared by every rate-limited route.
///
/// The keyspace is sharded, so checks for unrelated keys rarely contend.
/// A single key's prune, count and append happen under one shard lock.
#[derive(Default)]
pub struct SlidingWindowLimiter {
    logs: DashMap<ClientKey, RequestLog>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and record a request for `key` at the current instant.
    pub fn is_allowed(&self, key: &ClientKey, limit: usize, window: Duration) -> Decision {
        self.check_at(key, limit, window, Instant::now())
    }

    /// Check and record a request for `key` as if it arrived at `now`.
    pub fn check_at(
        &self,
        key: &ClientKey,
        limit: usize,
        window: Duration,
        now: Instant,
    ) -> Decision {
        debug_assert!(limit > 0, "rate limit must be positive");
        debug_assert!(!window.is_zero(), "rate limit window must be positive");
        debug_assert!(!key.as_str().is_empty(), "rate limit key must not be empty");

        let mut log = self.logs.entry(key.clone()).or_insert_with(|| RequestLog {
            hits: VecDeque::with_capacity(limit.min(64)),
            window,
        });
        log.window = window;
        log.prune(now);

        let count = log.hits.len();
        if count < limit {
            log.hits.push_back(now);
            Decision {
                allowed: true,
                current: count + 1,
                limit,
            }
        } else {
            Decision {
                allowed: false,
                current: count,
                limit,
            }
        }
    }

    /// Drop keys with no admitted request inside their window.
    ///
    /// Returns the number of keys removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.logs.len();
        self.logs.retain(|_, log| !log.is_idle(now));
        before.saturating_sub(self.logs.len())
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.logs.len()
    }

    /// Periodically evict idle keys until shutdown.
    pub async fn run_sweeper(
        self: Arc<Self>,
        every: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(interval_secs = every.as_secs(), "Rate limit sweeper starting");
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.evict_idle(Instant::now());
                    let remaining = self.tracked_keys();
                    if evicted > 0 {
                        tracing::debug!(evicted, remaining, "Evicted idle rate limit keys");
                    }
                    metrics::record_tracked_keys(remaining);
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Limit applied to one route, bound to the shared limiter.
#[derive(Clone)]
pub struct RoutePolicy {
    pub endpoint: &'static str,
    pub limit: usize,
    pub window: Duration,
    pub trust_forwarded_for: bool,
    limiter: Arc<SlidingWindowLimiter>,
}

impl RoutePolicy {
    pub fn new(endpoint: &'static str, route: RouteLimit, limiter: Arc<SlidingWindowLimiter>) -> Self {
        Self {
            endpoint,
            limit: route.limit,
            window: route.window(),
            trust_forwarded_for: false,
            limiter,
        }
    }

    /// Identify clients by `X-Forwarded-For` instead of the peer address.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn check(&self, identity: &str) -> Decision {
        let key = ClientKey::new(identity, self.endpoint);
        self.limiter.is_allowed(&key, self.limit, self.window)
    }
}

/// Client identity: the peer IP, or the first `X-Forwarded-For` hop when
/// `trust_forwarded_for` is set and the header is present.
pub fn client_identity(request: &Request<Body>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn set_limit_headers(response: &mut Response, decision: &Decision) {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining()));
}

/// Middleware admitting or rejecting a request against its route policy.
pub async fn rate_limit_middleware(
    State(policy): State<RoutePolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let identity = client_identity(&request, policy.trust_forwarded_for);
    let decision = policy.check(&identity);
    metrics::record_admission(policy.endpoint, decision.allowed);

    if decision.allowed {
        let mut response = next.run(request).await;
        set_limit_headers(&mut response, &decision);
        return response;
    }

    tracing::warn!(
        client = %identity,
        endpoint = policy.endpoint,
        current = decision.current,
        limit = decision.limit,
        "Rate limit exceeded"
    );

    let retry_after = policy.window.as_secs();
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "Too many requests",
            "message": "Rate limit exceeded. Try again in a few seconds.",
            "retry_after": retry_after,
        })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    set_limit_headers(&mut response, &decision);
    response
}
