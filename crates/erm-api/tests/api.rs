//! HTTP surface tests

use axum::http::StatusCode;
use axum_test::TestServer;
use erm_api::{build_router, ApiState};
use erm_core::ErmServices;
use serde_json::{json, Value};

fn server() -> TestServer {
    TestServer::new(build_router(ApiState::new(ErmServices::in_memory()))).unwrap()
}

async fn create_process(server: &TestServer) -> String {
    let response = server
        .post("/api/v1/processes")
        .json(&json!({ "name": "Payments", "kind": "operational" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_risk(server: &TestServer, process_id: &str) -> String {
    let response = server
        .post("/api/v1/risks")
        .json(&json!({
            "process_id": process_id,
            "description": "Payment released to a fraudulent beneficiary",
            "classification": "negative"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["code"], "1R");
    assert_eq!(body["data"]["state"], "unevaluated");
    body["data"]["id"].as_str().unwrap().to_string()
}

fn evaluation_body() -> Value {
    json!({
        "mode": "average_impact",
        "probability": 4,
        "impacts": [
            { "dimension": "personnel", "value": 5 },
            { "dimension": "legal", "value": 2 },
            { "dimension": "environmental", "value": 1 },
            { "dimension": "processes", "value": 5 },
            { "dimension": "reputational", "value": 3 },
            { "dimension": "economic", "value": 4 },
            { "dimension": "technological", "value": 2 }
        ]
    })
}

fn control_body() -> Value {
    json!({
        "description": "Call-back verification",
        "kind": "preventive",
        "assessment": {
            "mode": "three_factor",
            "factors": { "design": 3.0, "execution": 4.0, "robustness": 3.0 }
        }
    })
}

#[tokio::test]
async fn test_health() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["scoring_version"], 1);
}

#[tokio::test]
async fn test_risk_lifecycle_over_http() {
    let server = server();
    let process_id = create_process(&server).await;
    let risk_id = create_risk(&server, &process_id).await;

    let response = server
        .put(&format!("/api/v1/risks/{risk_id}/evaluation"))
        .json(&evaluation_body())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let inherent = body["data"]["inherent_risk"].as_f64().unwrap();
    assert!((inherent - 12.5714).abs() < 1e-3);
    assert_eq!(body["data"]["risk_level"], "HIGH");

    let response = server
        .post(&format!("/api/v1/risks/{risk_id}/controls"))
        .json(&control_body())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let effectiveness = body["data"]["outcome"]["effectiveness"].as_f64().unwrap();
    assert!((effectiveness - 2.0 / 3.0).abs() < 1e-9);
    assert!(body["data"]["outcome"]["residual_risk"].as_f64().unwrap() < inherent);

    let response = server.get(&format!("/api/v1/risks/{risk_id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["state"], "residual_scored");
    assert_eq!(body["data"]["controls"].as_array().unwrap().len(), 1);

    let response = server.get("/api/v1/risks/map").await;
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let cell = &body["data"][0]["inherent_cell"];
    assert_eq!(cell["probability"].as_u64().unwrap() * cell["impact"].as_u64().unwrap(), 15);

    let response = server.get("/api/v1/risks").add_query_param("level", "HIGH").await;
    let body: Value = response.json();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["per_page"], 10);
}

#[tokio::test]
async fn test_control_before_evaluation() {
    let server = server();
    let process_id = create_process(&server).await;
    let risk_id = create_risk(&server, &process_id).await;

    let response = server
        .post(&format!("/api/v1/risks/{risk_id}/controls"))
        .json(&control_body())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PRECONDITION_NOT_MET");
}

#[tokio::test]
async fn test_unknown_field_rejected() {
    let server = server();
    let response = server
        .post("/api/v1/processes")
        .json(&json!({ "name": "Payments", "kind": "operational", "budget": 10 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_out_of_range_probability() {
    let server = server();
    let process_id = create_process(&server).await;
    let risk_id = create_risk(&server, &process_id).await;

    let mut evaluation = evaluation_body();
    evaluation["probability"] = json!(7);
    let response = server
        .put(&format!("/api/v1/risks/{risk_id}/evaluation"))
        .json(&evaluation)
        .await;
    assert!(response.status_code().is_client_error());

    let response = server.get(&format!("/api/v1/risks/{risk_id}/evaluation")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_name_is_validation_error() {
    let server = server();
    let response = server
        .post("/api/v1/processes")
        .json(&json!({ "name": "   ", "kind": "support" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_risk() {
    let server = server();
    let response = server.get("/api/v1/risks/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_stateless_scoring() {
    let server = server();
    let response = server
        .post("/api/v1/scoring/classify")
        .json(&json!({ "score": 12.5714, "scale": "percent_of_max", "raw": true }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["band"], "HIGH");
    assert!((body["data"]["score"].as_f64().unwrap() - 50.2856).abs() < 1e-3);

    let response = server.post("/api/v1/scoring/grid").json(&json!({ "score": 25.0 })).await;
    let body: Value = response.json();
    assert_eq!(body["data"]["probability"], 5);
    assert_eq!(body["data"]["impact"], 5);

    let response = server
        .post("/api/v1/scoring/grid")
        .json(&json!({ "score": 12.0, "tolerance": 0.7 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/scoring/effectiveness")
        .json(&json!({ "mode": "three_factor", "factors": { "design": 5.0, "execution": 5.0, "robustness": 5.0 } }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["effectiveness"], 1.0);
}

#[tokio::test]
async fn test_scoring_config_replace_bumps_version() {
    let server = server();
    let response = server.get("/api/v1/catalogs/scoring").await;
    let body: Value = response.json();
    assert_eq!(body["data"]["version"], 1);

    let mut config = body["data"]["config"].clone();
    config["grid_tolerance"] = json!(0.9);
    let response = server.put("/api/v1/catalogs/scoring").json(&config).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    config["grid_tolerance"] = json!(0.02);
    let response = server.put("/api/v1/catalogs/scoring").json(&config).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["version"], 2);
}

#[tokio::test]
async fn test_openapi_document() {
    let server = server();
    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/v1/risks"].is_object());
    assert!(body["paths"]["/api/v1/scoring/classify"].is_object());
}

#[tokio::test]
async fn test_utilities_flow() {
    let server = server();
    let process_id = create_process(&server).await;
    let response = server
        .post("/api/v1/users")
        .json(&json!({ "name": "Dana", "email": "dana@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let user_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/v1/utilities/observations")
        .json(&json!({ "process_id": process_id, "author_id": user_id, "text": "Limits not reviewed" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["author"]["name"], "Dana");

    server
        .put(&format!("/api/v1/processes/{process_id}"))
        .json(&json!({ "description": "Outgoing payments" }))
        .await
        .assert_status_ok();
    let response = server
        .get("/api/v1/utilities/history")
        .add_query_param("process_id", &process_id)
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"][0]["action"], "updated");
    assert_eq!(body["data"][0]["fields"][0], "description");
    assert_eq!(body["data"][1]["action"], "created");

    let response = server
        .post("/api/v1/utilities/tasks")
        .json(&json!({ "user_id": user_id, "title": "Review limits" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let response = server
        .get("/api/v1/utilities/notifications")
        .add_query_param("user_id", &user_id)
        .add_query_param("unread", "true")
        .await;
    let body: Value = response.json();
    let notification_id = body["data"][0]["id"].as_str().unwrap().to_string();
    server
        .put(&format!("/api/v1/utilities/notifications/{notification_id}/read"))
        .await
        .assert_status_ok();
    let response = server
        .get("/api/v1/utilities/notifications")
        .add_query_param("user_id", &user_id)
        .add_query_param("unread", "true")
        .await;
    let body: Value = response.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_null_clears_risk_field() {
    let server = server();
    let process_id = create_process(&server).await;
    let risk_id = create_risk(&server, &process_id).await;

    server
        .put(&format!("/api/v1/risks/{risk_id}"))
        .json(&json!({ "zone": "North" }))
        .await
        .assert_status_ok();
    let response = server.put(&format!("/api/v1/risks/{risk_id}")).json(&json!({ "zone": null })).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"]["zone"].is_null());
}
