//! Region lookup
//!
//! Resolves a visitor key to a region label before the visit is recorded.
//! Loopback visitors never leave the process; everything else is a
//! best-effort HTTP lookup that degrades to "Unknown".

use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{LOCALHOST_REGION, UNKNOWN_REGION};

/// Region lookup settings
#[derive(Debug, Clone)]
pub struct GeoLookupConfig {
    /// Whether external lookups are made at all
    pub enabled: bool,

    /// Base URL; the visitor address is appended as a path segment
    pub base_url: String,

    /// Upper bound for a single lookup
    pub timeout: Duration,
}

impl Default for GeoLookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://ip-api.com/json".to_string(),
            timeout: Duration::from_millis(2000),
        }
    }
}

/// Lookup service response (ip-api.com layout)
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl LookupResponse {
    fn into_region(self) -> Option<String> {
        if self.status.as_deref() != Some("success") {
            return None;
        }
        self.country
            .map(|country| country.trim().to_string())
            .filter(|country| !country.is_empty())
    }
}

/// Region Resolver
#[derive(Debug, Clone)]
pub struct RegionResolver {
    client: reqwest::Client,
    config: GeoLookupConfig,
}

impl RegionResolver {
    /// Create a resolver with its own HTTP client
    pub fn new(config: GeoLookupConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build lookup client, using defaults");
                reqwest::Client::new()
            });

        Self { client, config }
    }

    /// Resolver that never leaves the process
    pub fn disabled() -> Self {
        Self::new(GeoLookupConfig {
            enabled: false,
            ..GeoLookupConfig::default()
        })
    }

    /// Resolve a visitor key to a region label
    ///
    /// Never fails: loopback is "Localhost", any lookup problem is "Unknown".
    /// Keys that are not IP addresses (such as "unknown") are never sent out.
    pub async fn resolve(&self, visitor_key: &str) -> String {
        if is_loopback(visitor_key) {
            return LOCALHOST_REGION.to_string();
        }
        if !self.config.enabled || visitor_key.trim().parse::<IpAddr>().is_err() {
            return UNKNOWN_REGION.to_string();
        }

        match self.lookup(visitor_key).await {
            Ok(Some(region)) => region,
            Ok(None) => {
                tracing::debug!(visitor_key = %visitor_key, "Region lookup returned no country");
                UNKNOWN_REGION.to_string()
            }
            Err(e) => {
                tracing::warn!(visitor_key = %visitor_key, error = %e, "Region lookup failed");
                UNKNOWN_REGION.to_string()
            }
        }
    }

    async fn lookup(&self, visitor_key: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            visitor_key.trim()
        );

        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<LookupResponse>()
            .await?;

        Ok(response.into_region())
    }
}

/// True for loopback addresses and the literal host name
pub fn is_loopback(visitor_key: &str) -> bool {
    let key = visitor_key.trim();
    if key.eq_ignore_ascii_case("localhost") {
        return true;
    }
    match key.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_loopback(),
        Ok(IpAddr::V6(ip)) => {
            ip.is_loopback() || ip.to_ipv4_mapped().map_or(false, |v4| v4.is_loopback())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("127.0.0.1"));
        assert!(is_loopback("127.5.6.7"));
        assert!(is_loopback("::1"));
        assert!(is_loopback("::ffff:127.0.0.1"));
        assert!(is_loopback("localhost"));
        assert!(is_loopback(" LOCALHOST "));

        assert!(!is_loopback("203.0.113.7"));
        assert!(!is_loopback("2001:db8::1"));
        assert!(!is_loopback(""));
        assert!(!is_loopback("unknown"));
    }

    #[test]
    fn test_lookup_response_into_region() {
        let ok: LookupResponse =
            serde_json::from_str(r#"{"status":"success","country":"Netherlands"}"#).unwrap();
        assert_eq!(ok.into_region(), Some("Netherlands".to_string()));

        let failed: LookupResponse =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        assert_eq!(failed.into_region(), None);

        let blank: LookupResponse =
            serde_json::from_str(r#"{"status":"success","country":"  "}"#).unwrap();
        assert_eq!(blank.into_region(), None);
    }

    #[tokio::test]
    async fn test_loopback_short_circuits_even_when_disabled() {
        let resolver = RegionResolver::disabled();

        assert_eq!(resolver.resolve("127.0.0.1").await, "Localhost");
        assert_eq!(resolver.resolve("::1").await, "Localhost");
    }

    #[tokio::test]
    async fn test_disabled_resolver_is_unknown() {
        let resolver = RegionResolver::disabled();
        assert_eq!(resolver.resolve("203.0.113.7").await, "Unknown");
    }

    #[tokio::test]
    async fn test_unreachable_lookup_is_unknown() {
        // Bind and drop a listener to get a port nothing is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resolver = RegionResolver::new(GeoLookupConfig {
            enabled: true,
            base_url: format!("http://{}/json", addr),
            timeout: Duration::from_millis(500),
        });

        assert_eq!(resolver.resolve("203.0.113.7").await, "Unknown");
    }

    #[tokio::test]
    async fn test_lookup_uses_country_from_service() {
        use axum::{extract::Path, routing::get, Json, Router};

        let app = Router::new().route(
            "/json/:ip",
            get(|Path(ip): Path<String>| async move {
                Json(serde_json::json!({"status": "success", "country": "Netherlands", "query": ip}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let resolver = RegionResolver::new(GeoLookupConfig {
            enabled: true,
            base_url: format!("http://{}/json/", addr),
            timeout: Duration::from_secs(5),
        });

        assert_eq!(resolver.resolve("203.0.113.7").await, "Netherlands");
    }

    #[tokio::test]
    async fn test_non_ip_key_skips_lookup() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use axum::{routing::get, Json, Router};

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/json/:ip",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(serde_json::json!({"status": "success", "country": "Netherlands"}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let resolver = RegionResolver::new(GeoLookupConfig {
            enabled: true,
            base_url: format!("http://{}/json", addr),
            timeout: Duration::from_secs(5),
        });

        assert_eq!(resolver.resolve("unknown").await, "Unknown");
        assert_eq!(resolver.resolve("not-an-ip").await, "Unknown");
        assert_eq!(resolver.resolve("").await, "Unknown");
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // A real address still goes out
        assert_eq!(resolver.resolve("203.0.113.7").await, "Netherlands");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
