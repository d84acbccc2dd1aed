use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
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

use auth_cell::router::auth_routes;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

async fn create_test_app(test_config: &TestConfig) -> Router {
    auth_routes(test_config.to_arc())
}

fn argon2_hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_register_issues_valid_token() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.ada@example.edu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::user_response(
                &user_id.to_string(),
                "ada@example.edu",
                "professor",
                &argon2_hash("correct horse battery staple"),
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "full_name": "Ada Lovelace",
                "email": "Ada@Example.edu",
                "password": "correct horse battery staple",
                "role": "professor"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["data"]["role"], "professor");

    // The token must validate against the same secret and carry the role.
    let token = json_response["data"]["token"].as_str().unwrap();
    let user = validate_token(token, &test_config.jwt_secret).unwrap();
    assert_eq!(user.id, user_id.to_string());
    assert_eq!(user.role.as_deref(), Some("professor"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_response(
                &Uuid::new_v4().to_string(),
                "taken@example.edu",
                "student",
                &argon2_hash("whatever"),
            )
        ])))
        .mount(&mock_server)
        .await;

    // The insert must not be attempted.
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "full_name": "Grace Hopper",
                "email": "taken@example.edu",
                "password": "a-strong-password",
                "role": "student"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], false);
    assert_eq!(json_response["message"], "User with this email already exists");
}

#[tokio::test]
async fn test_login_success() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.student@example.edu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_response(
                &user_id.to_string(),
                "student@example.edu",
                "student",
                &argon2_hash("s3cret-password"),
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "email": "student@example.edu",
                "password": "s3cret-password"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);

    let token = json_response["data"]["token"].as_str().unwrap();
    let user = validate_token(token, &test_config.jwt_secret).unwrap();
    assert_eq!(user.id, user_id.to_string());
    assert_eq!(user.role.as_deref(), Some("student"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_response(
                &Uuid::new_v4().to_string(),
                "student@example.edu",
                "student",
                &argon2_hash("the-real-password"),
            )
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "email": "student@example.edu",
                "password": "not-the-password"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email_same_message() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "email": "nobody@example.edu",
                "password": "anything"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Unknown email and wrong password are indistinguishable.
    assert_eq!(json_response["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_logout_acknowledged() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_url(&mock_server.uri());
    let app = create_test_app(&test_config).await;

    let request = Request::builder()
        .method("POST")
        .uri("/logout")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["message"], "Logged out successfully");
}
