//! Shared request helpers.

use axum::http::HeaderMap;

/// Extract client IP address and user-agent from request headers.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`.
/// Only the first hop of a forwarded chain is kept.
pub fn extract_request_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    (ip, user_agent)
}

/// Origin the storefront was loaded from, used to build gateway redirect URLs.
///
/// Falls back to `default` when the header is missing, not valid UTF-8, or empty.
pub fn request_origin(headers: &HeaderMap, default: &str) -> String {
    headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty() && *s != "null")
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let (ip, ua) = extract_request_info(&headers);
        assert_eq!(ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(ua.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(extract_request_info(&headers).0.as_deref(), Some("198.51.100.2"));
    }

    #[test]
    fn test_origin_fallback() {
        let headers = HeaderMap::new();
        assert_eq!(request_origin(&headers, "https://luxio.com"), "https://luxio.com");

        let mut headers = HeaderMap::new();
        headers.insert("origin", HeaderValue::from_static("https://shop.example/"));
        assert_eq!(request_origin(&headers, "https://luxio.com"), "https://shop.example");

        let mut headers = HeaderMap::new();
        headers.insert("origin", HeaderValue::from_static("null"));
        assert_eq!(request_origin(&headers, "https://luxio.com"), "https://luxio.com");
    }
}
