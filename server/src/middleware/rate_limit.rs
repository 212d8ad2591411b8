use axum::http::Request;
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::{net::IpAddr, sync::Arc, time::Duration};
use tower_governor::{
    errors::GovernorError,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::KeyExtractor,
};

/// Keys requests by source address.
///
/// Proxy headers are checked first so the limiter sees the real client
/// rather than the load balancer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // Cloudflare puts the client address in cf-connecting-ip.
        if let Some(ip) = headers
            .get("cf-connecting-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Generic proxies use x-forwarded-for; the first entry is the client.
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // No headers at all (local development, tests): bucket everything
        // under loopback rather than failing the request.
        Ok(IpAddr::from([127, 0, 0, 1]))
    }
}

pub type ApiRateConfig = GovernorConfig<IpKeyExtractor, NoOpMiddleware<QuantaInstant>>;

/// Shared limit for all `/api` traffic: 1000 requests per 15 minutes per
/// source address (900ms replenish, burst 1000). One config, one counter:
/// every route layered with it draws from the same budget.
pub fn create_api_config() -> Arc<ApiRateConfig> {
    Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(IpKeyExtractor)
            .period(Duration::from_millis(900)) // 0.9s * 1000 = 15 mins
            .burst_size(1000)
            .finish()
            .unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn prefers_cloudflare_header() {
        let req = Request::builder()
            .header("cf-connecting-ip", "203.0.113.7")
            .header("x-forwarded-for", "198.51.100.1")
            .body(Body::empty())
            .unwrap();
        let key = IpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn takes_first_forwarded_address() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let key = IpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn falls_back_to_loopback() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let key = IpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, IpAddr::from([127, 0, 0, 1]));
    }
}
