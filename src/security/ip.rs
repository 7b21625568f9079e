//! Client address resolution.
//!
//! Attempt records and whitelist lookups are keyed by the normalized string
//! form, so `::ffff:1.2.3.4` and `1.2.3.4` are the same client, as are `::1`
//! and `127.0.0.1`.

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

const MAPPED_V4_PREFIX: &str = "::ffff:";
const V6_LOOPBACK: &str = "::1";
const V4_LOOPBACK: &str = "127.0.0.1";

/// Canonical string form of a client address.
pub fn normalize_ip(ip: &str) -> String {
    let ip = ip.trim();
    let ip = ip.strip_prefix(MAPPED_V4_PREFIX).unwrap_or(ip);
    if ip == V6_LOOPBACK {
        V4_LOOPBACK.to_string()
    } else {
        ip.to_string()
    }
}

/// Resolve the normalized client IP of a request.
///
/// With `trust_forwarded_for`, the first entry of `X-Forwarded-For` wins over
/// the connection address. Falls back to `"unknown"` when neither is available.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(first) = forwarded {
            return normalize_ip(first);
        }
    }

    match peer {
        Some(addr) => normalize_ip(&addr.ip().to_string()),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn normalizes_mapped_and_loopback() {
        assert_eq!(normalize_ip("::ffff:1.2.3.4"), "1.2.3.4");
        assert_eq!(normalize_ip("::1"), "127.0.0.1");
        assert_eq!(normalize_ip(" 10.0.0.1 "), "10.0.0.1");
        assert_eq!(normalize_ip("2001:db8::1"), "2001:db8::1");
    }

    #[test]
    fn forwarded_first_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("::ffff:5.6.7.8, 10.0.0.1, 10.0.0.2"),
        );
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer), true), "5.6.7.8");
        assert_eq!(client_ip(&headers, Some(peer), false), "10.0.0.9");
    }

    #[test]
    fn peer_address_is_normalized() {
        let headers = HeaderMap::new();
        let v6_loopback: SocketAddr = "[::1]:4000".parse().unwrap();
        let mapped: SocketAddr = "[::ffff:1.2.3.4]:4000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(v6_loopback), true), "127.0.0.1");
        assert_eq!(client_ip(&headers, Some(mapped), true), "1.2.3.4");
        assert_eq!(client_ip(&headers, None, true), "unknown");
    }
}
