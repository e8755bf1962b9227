//! CORS policy for the ingestion front end
//!
//! Localhost origins (any port) are always accepted so local tooling can
//! post listing URLs. Additional exact origins come from configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use classified_extract::cors::cors_layer;
//!
//! let app = Router::new()
//!     .route("/:collection", post(ingest_handler))
//!     .layer(cors_layer(&["https://dashboard.example".to_string()]));
//! ```

use std::sync::Arc;
use std::time::Duration;

use http::{header::HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Methods used by the ingestion routes
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Preflight cache lifetime (1 hour)
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Build the CORS layer: localhost plus `extra_origins` (exact,
/// case-insensitive match).
pub fn cors_layer(extra_origins: &[String]) -> CorsLayer {
    let extra: Arc<Vec<String>> = Arc::new(
        extra_origins
            .iter()
            .map(|o| o.trim_end_matches('/').to_ascii_lowercase())
            .collect(),
    );

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            is_allowed_origin(origin, &extra)
        }))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([http::header::CONTENT_TYPE])
        .max_age(Duration::from_secs(DEFAULT_MAX_AGE_SECS))
}

fn is_allowed_origin(origin: &HeaderValue, extra: &[String]) -> bool {
    if is_localhost_origin(origin) {
        return true;
    }
    origin
        .to_str()
        .map(|o| o.to_ascii_lowercase())
        .is_ok_and(|o| extra.iter().any(|allowed| *allowed == o))
}

/// Whether `origin` is `http(s)://localhost`, `127.0.0.1` or `[::1]`,
/// optionally with a non-zero port.
///
/// ```rust
/// use http::header::HeaderValue;
/// use classified_extract::cors::is_localhost_origin;
///
/// assert!(is_localhost_origin(&HeaderValue::from_static("http://localhost:3000")));
/// assert!(!is_localhost_origin(&HeaderValue::from_static("http://localhost.evil.com")));
/// ```
pub fn is_localhost_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let origin = origin.to_ascii_lowercase();

    let Some(authority) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    let authority = authority.split('/').next().unwrap_or_default();

    ["localhost", "127.0.0.1", "[::1]"].iter().any(|host| {
        match authority.strip_prefix(*host) {
            Some("") => true,
            Some(rest) => rest
                .strip_prefix(':')
                .and_then(|port| port.parse::<u16>().ok())
                .is_some_and(|port| port > 0),
            None => false,
        }
    })
}
