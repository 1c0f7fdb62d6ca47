//! Client address resolution.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap, Request},
};

/// Address the request was attributed to, set by the audit middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Determine the client address.
///
/// Proxy headers are only believed when `trust_forwarded_for` is set;
/// otherwise any client could pick its own address and dodge the guard.
pub fn client_ip<B>(req: &Request<B>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_ip(req.headers()) {
            return ip;
        }
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    // First hop of X-Forwarded-For is the original client
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Client address and user agent of the current request.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = match parts.extensions.get::<ClientIp>() {
            Some(ClientIp(ip)) => ip.clone(),
            None => parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        };
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(ClientInfo { ip, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(headers: &[(&str, &str)], peer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            req.extensions_mut()
                .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        }
        req
    }

    #[test]
    fn test_peer_address() {
        let req = request(&[], Some("192.168.1.7:5555"));
        assert_eq!(client_ip(&req, false), "192.168.1.7");
    }

    #[test]
    fn test_forwarded_ignored_when_untrusted() {
        let req = request(&[("X-Forwarded-For", "10.0.0.5")], Some("127.0.0.1:4000"));
        assert_eq!(client_ip(&req, false), "127.0.0.1");
    }

    #[test]
    fn test_forwarded_first_hop_when_trusted() {
        let req = request(
            &[("X-Forwarded-For", "10.0.0.5, 172.16.0.1")],
            Some("127.0.0.1:4000"),
        );
        assert_eq!(client_ip(&req, true), "10.0.0.5");
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request(&[("X-Real-IP", "10.0.0.9")], None);
        assert_eq!(client_ip(&req, true), "10.0.0.9");
    }

    #[test]
    fn test_unknown() {
        let req = request(&[], None);
        assert_eq!(client_ip(&req, true), "unknown");
    }
}
