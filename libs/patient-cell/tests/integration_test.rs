use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};
use assert_matches::assert_matches;

use patient_cell::router::patient_routes;
use patient_cell::{PatientError, PatientService};
use shared_utils::test_utils::{TestConfig, MockSupabaseResponses};

fn create_test_app(mock_server: &MockServer) -> Router {
    patient_routes(TestConfig::with_supabase_url(&mock_server.uri()).to_arc())
}

async fn mount_patient(mock_server: &MockServer, patient_id: i64) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_response(patient_id)
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_conditions(mock_server: &MockServer, patient_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/patient_conditions"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_condition_profile_normalizes_records() {
    let mock_server = MockServer::start().await;
    mount_patient(&mock_server, 5).await;
    mount_conditions(&mock_server, 5, json!([
        MockSupabaseResponses::patient_condition_response(5, "Diabetes, Heart disease", "severe"),
        MockSupabaseResponses::patient_condition_response(5, "diabetes", "mild"),
    ])).await;

    let service = PatientService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    let profile = service.get_condition_profile(5).await.unwrap();

    assert_eq!(profile.records.len(), 2);
    assert!(profile.has_usable_conditions());
    assert_eq!(
        profile.normalized_conditions.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["diabetes", "heart disease"]
    );
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = PatientService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    let result = service.get_condition_profile(999999).await;

    assert_matches!(result, Err(PatientError::NotFound));
}

#[tokio::test]
async fn test_patient_without_records_has_no_usable_conditions() {
    let mock_server = MockServer::start().await;
    mount_patient(&mock_server, 8).await;
    mount_conditions(&mock_server, 8, json!([])).await;

    let service = PatientService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    let profile = service.get_condition_profile(8).await.unwrap();

    assert!(profile.records.is_empty());
    assert!(!profile.has_usable_conditions());
}

#[tokio::test]
async fn test_database_failure_is_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection reset", "XX000")
        ))
        .mount(&mock_server)
        .await;

    let service = PatientService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    let result = service.get_patient(1).await;

    assert_matches!(result, Err(PatientError::DatabaseError(msg)) if msg.contains("500"));
}

#[tokio::test]
async fn test_get_patient_conditions_endpoint() {
    let mock_server = MockServer::start().await;
    mount_patient(&mock_server, 12).await;
    mount_conditions(&mock_server, 12, json!([
        MockSupabaseResponses::patient_condition_response(12, " Asthma ", "mild"),
    ])).await;

    let app = create_test_app(&mock_server);

    let request = Request::builder()
        .method("GET")
        .uri("/12/conditions")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["patient_id"], 12);
    assert_eq!(json_response["normalized_conditions"], json!(["asthma"]));
    assert_eq!(json_response["total"], 1);
}

#[tokio::test]
async fn test_get_patient_conditions_rejects_non_numeric_id() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let request = Request::builder()
        .method("GET")
        .uri("/not-a-number/conditions")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_patient_conditions_unknown_patient() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);

    let request = Request::builder()
        .method("GET")
        .uri("/999999/conditions")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["error"], "Patient not found");
}
