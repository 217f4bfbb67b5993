use crate::error::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

/// Rate limiter keyed by client IP address
pub type IpRateLimiter = Arc<RateLimiter<SocketAddr, DashMapStateStore<SocketAddr>, DefaultClock>>;

/// Create a keyed rate limiter allowing `attempts` per `window_seconds` per IP.
pub fn create_ip_rate_limiter(attempts: u32, window_seconds: u64) -> IpRateLimiter {
    let attempts = attempts.max(1);
    let window_ms = window_seconds.max(1) * 1000;
    let period = Duration::from_millis((window_ms / attempts as u64).max(1));
    let burst = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst);

    Arc::new(RateLimiter::dashmap(quota))
}

/// Limiter plus the policy for finding the client address.
#[derive(Clone)]
pub struct IpRateLimit {
    limiter: IpRateLimiter,
    trust_forwarded_for: bool,
}

impl IpRateLimit {
    /// `trust_forwarded_for` must only be set when every request arrives
    /// through a proxy that appends the peer to `x-forwarded-for`.
    pub fn new(limiter: IpRateLimiter, trust_forwarded_for: bool) -> Self {
        Self {
            limiter,
            trust_forwarded_for,
        }
    }
}

/// Client address used as the limiter key, with the port zeroed.
///
/// Uses the last `x-forwarded-for` hop (the one our proxy added) when the
/// header is trusted, otherwise the peer address.
pub fn client_addr(request: &Request, trust_forwarded_for: bool) -> Option<SocketAddr> {
    let forwarded_ip = if trust_forwarded_for {
        request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.rsplit(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    } else {
        None
    };

    forwarded_ip
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .map(|ip| SocketAddr::new(ip, 0))
}

/// Middleware for IP-based rate limiting.
pub async fn ip_rate_limit_middleware(
    State(rate_limit): State<IpRateLimit>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match client_addr(&request, rate_limit.trust_forwarded_for) {
        Some(addr) => match rate_limit.limiter.check_key(&addr) {
            Ok(_) => Ok(next.run(request).await),
            Err(negative) => {
                let wait_time = negative.wait_time_from(DefaultClock::default().now());
                tracing::warn!(ip = %addr.ip(), path = %request.uri().path(), "Rate limit exceeded");
                Err(AppError::TooManyRequests(
                    "Too many requests from this IP. Please try again later.".to_string(),
                    Some(wait_time.as_secs().max(1)),
                ))
            }
        },
        None => {
            tracing::warn!("Could not determine IP for rate limiting");
            Ok(next.run(request).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::net::Ipv4Addr;

    fn request(peer: [u8; 4], forwarded_for: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/registrations");
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 51234))));
        request
    }

    #[test]
    fn limiter_allows_burst_then_blocks() {
        let limiter = create_ip_rate_limiter(2, 60);
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 0);

        assert!(limiter.check_key(&addr).is_ok());
        assert!(limiter.check_key(&addr).is_ok());
        assert!(limiter.check_key(&addr).is_err());
    }

    #[test]
    fn limiter_tracks_ips_independently() {
        let limiter = create_ip_rate_limiter(1, 60);
        let a = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 0);
        let b = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), 0);

        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&b).is_ok());
        assert!(limiter.check_key(&a).is_err());
    }

    #[test]
    fn forwarded_for_is_ignored_unless_trusted() {
        let request = request([192, 0, 2, 7], Some("203.0.113.9"));

        assert_eq!(
            client_addr(&request, false),
            Some(SocketAddr::from(([192, 0, 2, 7], 0)))
        );
    }

    #[test]
    fn trusted_forwarded_for_uses_last_hop() {
        let request = request([10, 0, 0, 2], Some("198.51.100.1, 203.0.113.9"));

        assert_eq!(
            client_addr(&request, true),
            Some(SocketAddr::from(([203, 0, 113, 9], 0)))
        );
    }

    #[test]
    fn trusted_but_missing_header_falls_back_to_peer() {
        let request = request([10, 0, 0, 2], None);

        assert_eq!(
            client_addr(&request, true),
            Some(SocketAddr::from(([10, 0, 0, 2], 0)))
        );
    }

    #[test]
    fn rotating_forwarded_for_shares_one_key() {
        let limiter = create_ip_rate_limiter(2, 60);

        let outcomes: Vec<bool> = (1..=3)
            .map(|n| {
                let spoofed = format!("203.0.113.{}", n);
                let request = request([192, 0, 2, 7], Some(&spoofed));
                let addr = client_addr(&request, false).unwrap();
                limiter.check_key(&addr).is_ok()
            })
            .collect();

        assert_eq!(outcomes, vec![true, true, false]);
    }
}
