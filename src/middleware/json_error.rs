use axum::{
    Json,
    body::{Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    response::{ErrorBody, log_app_error},
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Rewrites plain-text error responses (extractor rejections, unknown routes,
/// wrong methods) into the `{"error": ...}` shape used by the handlers.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    if !response.status().is_client_error() && !response.status().is_server_error() {
        return response;
    }

    if is_json_response(&response) {
        return response;
    }

    let status = response.status();
    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => body_bytes_to_message(status, bytes),
        Err(_) => default_message(status),
    };
    if status.is_server_error() {
        log_app_error(&AppError::internal(message.clone()), status);
    }

    let mut new_response = (
        client_status(status),
        Json(ErrorBody { error: message }),
    )
        .into_response();
    copy_headers(&parts.headers, &mut new_response);
    new_response
}

/// Body decoding failures are reported as bad requests.
fn client_status(status: StatusCode) -> StatusCode {
    match status {
        StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY => {
            StatusCode::BAD_REQUEST
        }
        other => other,
    }
}

fn is_json_response(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("application/json") || value.contains("+json")
        })
        .unwrap_or(false)
}

fn body_bytes_to_message(status: StatusCode, bytes: Bytes) -> String {
    let message = String::from_utf8_lossy(&bytes).trim().to_string();
    if message.is_empty() {
        return default_message(status);
    }
    message
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn copy_headers(src: &HeaderMap, dest: &mut Response) {
    for (name, value) in src {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        dest.headers_mut().insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{self, Body},
        http::{Request, StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    use super::json_error_middleware;

    fn app() -> Router {
        Router::new()
            .route("/plain", get(|| async { (StatusCode::CONFLICT, "already there") }))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(json_error_middleware))
    }

    async fn call(method: &str, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("request should succeed");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn wraps_plain_text_errors() {
        let (status, _, body) = call("GET", "/plain").await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "already there");
    }

    #[tokio::test]
    async fn wrong_method_gets_a_json_body() {
        let (status, content_type, body) = call("POST", "/ok").await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(content_type.unwrap_or_default().contains("application/json"));
        assert_eq!(json["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn leaves_successful_responses_alone() {
        let (status, _, body) = call("GET", "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"fine");
    }
}
