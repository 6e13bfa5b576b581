//! Visitor identity.
//!
//! Anonymous visitors are identified by their client address only. This is a
//! weak proxy (shared NATs, rotating addresses) and is not a security boundary.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderName;

pub static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Used when neither a forwarded header nor a peer address is available.
pub const UNKNOWN_VISITOR: &str = "unknown";

/// The resolved client address of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorIp(pub String);

impl<S> FromRequestParts<S> for VisitorIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(&X_FORWARDED_FOR)
            .and_then(|value| value.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self(resolve(forwarded, peer)))
    }
}

/// Prefers the first `X-Forwarded-For` entry, then the peer address.
pub fn resolve(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_VISITOR.to_string())
}
