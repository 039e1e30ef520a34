use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};
use serde_json::{Value, json};
use tower::ServiceExt;

use todo_api::{
    db::entities::todo,
    test_helpers::{test_app, todo_model},
};

fn mock() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn send_json(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request")
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn assert_untouched(db: DatabaseConnection) {
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn create_requires_a_title() {
    for body in [json!({}), json!({ "title": "" }), json!({ "title": "   " })] {
        let db = mock().into_connection();
        let (status, json) = call(
            test_app(db.clone()),
            send_json("POST", "/api/todos", body.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json, json!({ "error": "Title is required" }));
        assert_untouched(db);
    }
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let db = mock().into_connection();
    let (status, json) = call(test_app(db), send_json("POST", "/api/todos", "{\"title\":")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["error"].as_str().expect("error message");
    assert!(message.starts_with("Invalid JSON body"), "{message}");
}

#[tokio::test]
async fn create_rejects_bodies_without_json_content_type() {
    let db = mock().into_connection();
    let request = Request::builder()
        .method("POST")
        .uri("/api/todos")
        .body(Body::from(r#"{"title":"Buy milk"}"#))
        .expect("request");
    let (status, json) = call(test_app(db), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn create_returns_201_with_the_stored_item() {
    let db = mock()
        .append_query_results([[todo_model(1, "Buy milk", false)]])
        .into_connection();
    let (status, json) = call(
        test_app(db),
        send_json("POST", "/api/todos", json!({ "title": "Buy milk" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Buy milk");
    assert_eq!(json["completed"], false);
    assert!(json["created_at"].is_string());
    assert!(json["updated_at"].is_string());
}

#[tokio::test]
async fn list_of_empty_store_is_an_empty_array() {
    let db = mock()
        .append_query_results([Vec::<todo::Model>::new()])
        .into_connection();
    let (status, json) = call(test_app(db), get("/api/todos")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn list_returns_every_item() {
    let db = mock()
        .append_query_results([[
            todo_model(1, "Buy milk", false),
            todo_model(2, "Walk dog", true),
        ]])
        .into_connection();
    let (status, json) = call(test_app(db), get("/api/todos")).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert_eq!(titles, ["Buy milk", "Walk dog"]);
}

#[tokio::test]
async fn missing_items_are_404() {
    let db = mock()
        .append_query_results([Vec::<todo::Model>::new()])
        .into_connection();
    let (status, json) = call(test_app(db), get("/api/todos/42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "error": "Todo not found" }));
}

#[tokio::test]
async fn update_of_missing_item_is_404() {
    let db = mock()
        .append_query_results([Vec::<todo::Model>::new()])
        .into_connection();
    let (status, json) = call(
        test_app(db),
        send_json("PUT", "/api/todos/7", json!({ "completed": true }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Todo not found");
}

#[tokio::test]
async fn delete_of_missing_item_is_404() {
    let db = mock()
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let (status, json) = call(test_app(db), delete("/api/todos/7")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Todo not found");
}

#[tokio::test]
async fn delete_returns_204_without_body() {
    let db = mock()
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let (status, json) = call(test_app(db), delete("/api/todos/7")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);
}

#[tokio::test]
async fn non_integer_ids_are_rejected_before_the_store() {
    let db = mock().into_connection();
    let (status, json) = call(test_app(db.clone()), get("/api/todos/abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid todo id");
    assert_untouched(db);
}

#[tokio::test]
async fn ids_beyond_the_column_range_are_404_before_the_store() {
    for id in [
        "2147483648",
        "9223372036854775808",
        "-9223372036854775809",
        "340282366920938463463374607431768211456",
    ] {
        let db = mock().into_connection();
        let (status, json) = call(test_app(db.clone()), get(&format!("/api/todos/{id}"))).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "id {id}");
        assert_eq!(json["error"], "Todo not found");
        assert_untouched(db);
    }
}

#[tokio::test]
async fn malformed_ids_are_400_for_every_method() {
    for id in ["abc", "1.5", "12abc", "%20"] {
        let uri = format!("/api/todos/{id}");
        for request in [
            get(&uri),
            send_json("PUT", &uri, json!({ "completed": true }).to_string()),
            delete(&uri),
        ] {
            let db = mock().into_connection();
            let (status, json) = call(test_app(db.clone()), request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "id {id}");
            assert_eq!(json["error"], "Invalid todo id");
            assert_untouched(db);
        }
    }
}

#[tokio::test]
async fn store_failures_are_500_with_a_generic_message() {
    let db = mock()
        .append_query_errors([DbErr::Custom("connection reset by peer".to_string())])
        .into_connection();
    let (status, json) = call(test_app(db), get("/api/todos")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Database error" }));
}

#[tokio::test]
async fn health_is_200_when_the_database_answers() {
    let db = mock()
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let (status, json) = call(test_app(db), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "healthy");
    assert_eq!(json["storage"], "postgresql");
    assert_eq!(json["environment"], "dev");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_is_503_when_the_database_is_unreachable() {
    let db = mock()
        .append_exec_errors([DbErr::Custom("connection refused".to_string())])
        .into_connection();
    let (status, json) = call(test_app(db), get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "unhealthy");
}

#[tokio::test]
async fn unknown_routes_get_a_json_404() {
    let db = mock().into_connection();
    let (status, json) = call(test_app(db), get("/api/nothing-here")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "error": "Not Found" }));
}

#[tokio::test]
async fn wrong_methods_get_a_json_405() {
    let db = mock().into_connection();
    let (status, json) = call(test_app(db), send_json("PATCH", "/api/todos/1", "{}")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let db = mock().into_connection();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/todos")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("request");
    let response = test_app(db)
        .oneshot(request)
        .await
        .expect("request should succeed");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}
