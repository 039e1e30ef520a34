use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

pub fn cors_layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    if cfg.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = cfg
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::cors_layer;
    use crate::config::CorsConfig;

    #[test]
    fn accepts_explicit_origins() {
        let cfg = CorsConfig {
            allowed_origins: vec!["https://todo.example.com".to_string()],
        };
        assert!(cors_layer(&cfg).is_ok());
    }

    #[test]
    fn rejects_origins_that_are_not_header_values() {
        let cfg = CorsConfig {
            allowed_origins: vec!["https://bad\norigin".to_string()],
        };
        let err = cors_layer(&cfg).expect_err("newline is not a valid header value");
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
