use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Best-effort client address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(ip) = header_ip(headers, "x-forwarded-for", |v| v.split(',').next()) {
        return ip;
    }
    if let Some(ip) = header_ip(headers, "x-real-ip", Some) {
        return ip;
    }
    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

fn header_ip<'a>(
    headers: &'a HeaderMap,
    name: &str,
    pick: impl Fn(&'a str) -> Option<&'a str>,
) -> Option<String> {
    let raw = headers.get(name)?.to_str().ok()?;
    let candidate = pick(raw)?.trim();
    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}
