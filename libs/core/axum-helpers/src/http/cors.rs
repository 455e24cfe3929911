use axum::http::{HeaderValue, Method, header, header::InvalidHeaderValue};
use core_config::cors::{AllowedOrigins, CorsConfig};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Build the CORS layer for a [`CorsConfig`].
///
/// - Methods: GET, POST, PUT, DELETE, OPTIONS
/// - Headers: Content-Type, Accept
/// - Max age: 1 hour
///
/// Credentials are never allowed: browsers reject them together with a
/// wildcard origin.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, InvalidHeaderValue> {
    let allow_origin = match &config.allowed_origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(origins) => {
            let origins = origins
                .iter()
                .map(|origin| origin.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    async fn preflight(config: CorsConfig, origin: &str) -> Option<HeaderValue> {
        let app = Router::new()
            .route("/users", get(|| async { "ok" }))
            .layer(cors_layer(&config).unwrap());

        let response = app
            .oneshot(
                Request::get("/users")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_any_origin_is_allowed() {
        let header = preflight(CorsConfig::any(), "https://somewhere.example").await;
        assert_eq!(header.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_listed_origin_is_echoed() {
        let config = CorsConfig {
            allowed_origins: AllowedOrigins::List(vec!["https://app.example".to_string()]),
        };
        let header = preflight(config, "https://app.example").await;
        assert_eq!(header.unwrap(), "https://app.example");
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_header() {
        let config = CorsConfig {
            allowed_origins: AllowedOrigins::List(vec!["https://app.example".to_string()]),
        };
        assert!(preflight(config, "https://evil.example").await.is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let config = CorsConfig {
            allowed_origins: AllowedOrigins::List(vec!["bad\norigin".to_string()]),
        };
        assert!(cors_layer(&config).is_err());
    }
}
