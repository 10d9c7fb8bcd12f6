//! Integration tests for the AegisCare Graph server.
//!
//! These tests start a real Neo4j container via testcontainers, load the
//! sample dataset and exercise the HTTP endpoints through the Axum router.
//! They need a local Docker daemon: `cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use testcontainers::{
    ContainerAsync, GenericImage, ImageExt,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};
use tower::ServiceExt;

use aegis_server::ai::ClaudeClient;
use aegis_server::config::{CompletionConfig, Config, GraphConfig};
use aegis_server::db::{GraphDb, Neo4jStore, seed};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEST_API_KEY: &str = "test-secret-key";
const NEO4J_PASSWORD: &str = "aegis-test-password";

fn test_config(uri: String) -> Config {
    Config {
        graph: GraphConfig {
            uri,
            username: "neo4j".to_string(),
            password: NEO4J_PASSWORD.to_string(),
            database: "neo4j".to_string(),
            query_timeout: Duration::from_secs(10),
        },
        completion: CompletionConfig {
            api_key: "sk-test".to_string(),
            model: "test-model".to_string(),
            // Nothing listens here, so explanations use the local fallback
            api_url: "http://127.0.0.1:1/v1/messages".to_string(),
            timeout: Duration::from_secs(2),
        },
        bind_address: "0.0.0.0:0".to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        cors_origins: vec!["*".to_string()],
        rate_limit_rps: 1000,
    }
}

/// Start Neo4j, seed it, and build the app router against it.
async fn start_app() -> (ContainerAsync<GenericImage>, Router) {
    let image = GenericImage::new("neo4j", "5")
        .with_exposed_port(7687.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Started."))
        .with_env_var("NEO4J_AUTH", format!("neo4j/{}", NEO4J_PASSWORD));

    let container = image.start().await.expect("Failed to start Neo4j");
    let port = container
        .get_host_port_ipv4(7687)
        .await
        .expect("Failed to get mapped port");

    let config = test_config(format!("bolt://127.0.0.1:{}", port));
    let store = Neo4jStore::new(GraphDb::new(config.graph.clone()));

    // Bolt can lag a moment behind the "Started." log line
    let mut retries = 0;
    loop {
        match store.db().connect().await {
            Ok(()) => break,
            Err(e) => {
                if retries >= 30 {
                    panic!("Neo4j not ready after 30 retries: {}", e);
                }
            }
        }
        retries += 1;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    seed::seed_database(&store).await.expect("Failed to seed graph");

    let completion = ClaudeClient::new(&config.completion).expect("Failed to build client");
    let app = aegis_server::build_app(Arc::new(store), Arc::new(completion), &config);
    (container, app)
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

/// Build a request with the auth header.
fn authed(method: &str, uri: &str, body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-Key", TEST_API_KEY);
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    authed("GET", uri, None)
}

fn post(uri: &str, body: JsonValue) -> Request<Body> {
    authed("POST", uri, Some(body))
}

fn put(uri: &str) -> Request<Body> {
    authed("PUT", uri, None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_and_readiness() {
    let (_container, app) = start_app().await;

    let public = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = request(&app, public).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let ready = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, body) = request(&app, ready).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reseeding_reports_cleared_nodes() {
    let (container, _app) = start_app().await;
    let port = container
        .get_host_port_ipv4(7687)
        .await
        .expect("Failed to get mapped port");
    let config = test_config(format!("bolt://127.0.0.1:{}", port));
    let store = Neo4jStore::new(GraphDb::new(config.graph.clone()));

    let summary = seed::seed_database(&store).await.expect("Failed to reseed");
    // 8 symptoms, 6 diseases, 9 drugs, 3 lab tests, 2 protocols, 5 patients
    assert_eq!(summary.removed, 33);
    assert_eq!(summary.nodes, 33);
    assert_eq!(summary.interactions, 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_seeded_patient_graph() {
    let (_container, app) = start_app().await;

    let (status, body) = request(&app, get("/api/v1/patients/pat_001/graph")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["name"], "John Smith");
    assert_eq!(body["symptoms"].as_array().unwrap().len(), 2);
    assert_eq!(body["diseases"].as_array().unwrap().len(), 2);
    assert_eq!(body["drugs"].as_array().unwrap().len(), 3);
    assert_eq!(body["lab_tests"].as_array().unwrap().len(), 1);
    assert_eq!(body["treatment_protocols"][0]["name"], "Hypertension Management");

    // Robert Williams has no lab results
    let (status, body) = request(&app, get("/api/v1/patients/pat_003/graph")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lab_tests"], json!([]));

    let (status, body) = request(&app, get("/api/v1/patients/pat_404/graph")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_link_lifecycle() {
    let (_container, app) = start_app().await;

    // 1. Create
    let (status, created) = request(
        &app,
        post(
            "/api/v1/patients",
            json!({"name": "Ana Lee", "age": 41, "gender": "Female"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    // 2. Read
    let (status, body) = request(&app, get(&format!("/api/v1/patients/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 41);

    // 3. Link twice, one edge
    for _ in 0..2 {
        let (status, body) = request(&app, put(&format!("/api/v1/patients/{}/drugs/drug_005", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["linked"], true);
    }
    let (status, _) = request(&app, put(&format!("/api/v1/patients/{}/drugs/drug_006", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, graph) = request(&app, get(&format!("/api/v1/patients/{}/graph", id))).await;
    assert_eq!(graph["drugs"].as_array().unwrap().len(), 2);

    // 4. The new drug pair is picked up by the evaluator
    let (status, body) = request(
        &app,
        get(&format!("/api/v1/patients/{}/drug-interactions", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["risk_level"], "high");

    // 5. Missing endpoint
    let (status, _) = request(&app, put(&format!("/api/v1/patients/{}/drugs/drug_404", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_interactions_and_alerts() {
    let (_container, app) = start_app().await;

    let (status, body) = request(&app, get("/api/v1/patients/pat_003/drug-interactions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = request(&app, get("/api/v1/patients/pat_003/drug-risk-alerts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = request(
        &app,
        get("/api/v1/drug-interactions?drug1_id=drug_004&drug2_id=drug_005"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drug1"], "Aspirin");
    assert_eq!(body["drug2"], "Warfarin");

    let (status, body) = request(
        &app,
        get("/api/v1/patients/pat_003/safe-alternatives?drug_id=drug_004"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "drug_003");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_similarity_and_reverse_lookup() {
    let (_container, app) = start_app().await;

    let (status, body) = request(&app, get("/api/v1/patients/pat_001/similar?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let ranked = body.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["patient_id"], "pat_005");
    assert_eq!(ranked[0]["similarity_score"], 1.8);

    let (status, body) = request(&app, get("/api/v1/diseases/dis_003/patients")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["James Brown", "John Smith", "Robert Williams"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_explanation_fallback() {
    let (_container, app) = start_app().await;

    let (status, body) = request(
        &app,
        post(
            "/api/v1/explanations",
            json!({"patient_id": "pat_002", "question": "Is Sertraline appropriate?"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["explanation"].as_str().unwrap().contains("Mary Johnson"));
    assert_eq!(body["evidence"].as_array().unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_auth_required() {
    let (_container, app) = start_app().await;

    let req = Request::builder()
        .uri("/api/v1/patients")
        .body(Body::empty())
        .unwrap();
    let (status, body) = request(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}
