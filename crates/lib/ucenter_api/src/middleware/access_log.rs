//! Access log: one `info` line per request.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    http::header::{HOST, USER_AGENT},
    middleware::Next,
    response::Response,
};
use tracing::info;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

pub async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let host = header_str(&request, HOST.as_str()).to_string();
    let user_agent = header_str(&request, USER_AGENT.as_str()).to_string();
    let client_ip = client_ip(&request).unwrap_or_default();

    let response = next.run(request).await;

    info!(
        status = response.status().as_u16(),
        cost_ms = start.elapsed().as_millis() as u64,
        client_ip = %client_ip,
        host = %host,
        method = %method,
        path = %path,
        user_agent = %user_agent,
        "request"
    );
    response
}

fn header_str<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Caller address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// socket peer when the server was started with connect info.
pub fn client_ip(request: &Request) -> Option<String> {
    let forwarded = header_str(request, X_FORWARDED_FOR)
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    let real_ip = header_str(request, X_REAL_IP).trim();
    if !real_ip.is_empty() {
        return Some(real_ip.to_string());
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}
