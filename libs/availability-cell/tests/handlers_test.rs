use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_cell::router::availability_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn create_test_app(test_config: &TestConfig) -> Router {
    availability_routes(test_config.to_arc())
}

#[tokio::test]
async fn test_create_slot_requires_token() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "start_time": "2024-01-01T09:00:00Z",
                "end_time": "2024-01-01T09:30:00Z"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_slot_forbidden_for_students() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let student = TestUser::student("student@example.edu");
    let token = JwtTestUtils::create_test_token(&student, &test_config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "start_time": "2024-01-01T09:00:00Z",
                "end_time": "2024-01-01T09:30:00Z"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_slot_created_for_professor() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let professor = TestUser::professor("prof@example.edu");
    let token = JwtTestUtils::create_test_token(&professor, &test_config.jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_slots"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::slot_response(&Uuid::new_v4().to_string(), &professor.id, false)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "start_time": "2024-01-01T09:00:00Z",
                "end_time": "2024-01-01T09:30:00Z"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["data"]["is_booked"], false);
}

#[tokio::test]
async fn test_open_slots_visible_to_students() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let student = TestUser::student("student@example.edu");
    let token = JwtTestUtils::create_test_token(&student, &test_config.jwt_secret, Some(24));
    let professor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_slots"))
        .and(query_param("professor_id", format!("eq.{}", professor_id)))
        .and(query_param("is_booked", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(
                &Uuid::new_v4().to_string(),
                &professor_id.to_string(),
                false,
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/professors/{}", professor_id))
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_my_slots_rejects_expired_token() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let professor = TestUser::professor("prof@example.edu");
    let token = JwtTestUtils::create_expired_token(&professor, &test_config.jwt_secret);

    let request = Request::builder()
        .method("GET")
        .uri("/me")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
