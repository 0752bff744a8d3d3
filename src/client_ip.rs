use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Derive the caller's address for a request
///
/// Takes the `X-Forwarded-For` header when present, falling back to the
/// socket peer address. Proxies append to the header as a comma-separated
/// list, so the first trimmed entry is the original caller.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .unwrap_or_else(|| {
            peer.map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::from(([192, 168, 1, 1], 43210)))
    }

    #[test]
    fn test_forwarded_for_single_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5"));
        assert_eq!(client_ip(&headers, peer()), "203.0.113.5");
    }

    #[test]
    fn test_forwarded_for_takes_first_of_chain() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1, 172.16.0.1"),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.5");
    }

    #[test]
    fn test_forwarded_for_trims_whitespace() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  203.0.113.5 ,10.0.0.1"));
        assert_eq!(client_ip(&headers, peer()), "203.0.113.5");
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer()), "192.168.1.1");
    }

    #[test]
    fn test_empty_header_falls_back_to_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&headers, peer()), "192.168.1.1");
    }

    #[test]
    fn test_no_peer_yields_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None), "unknown");
    }
}
