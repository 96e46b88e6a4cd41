//! Rate limiting for the credential endpoints, using governor and
//! `tower_governor`.
//!
//! Clients are keyed by the TCP peer address. Forwarding headers such as
//! `x-forwarded-for` are client-controlled and ignored, so the router must be
//! served with `into_make_service_with_connect_info::<SocketAddr>()`.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for registration and login: ~10 requests per minute per IP.
///
/// Replenishes one request every 6 seconds with a burst of 5. Returns `None`
/// only if governor rejects the quota.
#[must_use]
pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(PeerIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}
