mod common;

use common::{AdminTest, run_async, stderr, stdout};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn projects() -> Value {
    json!({
        "success": true,
        "data": [
            {"_id": "p1", "projectName": "Palm Villa", "projectAddress": "Goa", "type": "villa", "status": "active", "date": "2024-03-01"},
            {"_id": "p2", "projectName": "Sea View", "projectAddress": "Mumbai", "type": "apartment", "status": "deactive", "date": "2024-02-01"},
            {"_id": "p3", "projectName": "Hill Crest", "projectAddress": "Pune", "type": "villa", "status": "pending", "date": "2024-01-01"},
        ]
    })
}

async fn project_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects()))
        .mount(&server)
        .await;
    server
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_and_get() {
    let admin = AdminTest::new();

    let output = admin.run_success(&["config", "set", "page_size", "25"]);
    assert!(output.contains("page_size"));

    let output = admin.run_success(&["config", "get", "page_size"]);
    assert_eq!(output.trim(), "25");

    let config = admin.read_file("config.yaml");
    assert!(config.contains("page_size: 25"));
}

#[test]
fn test_config_endpoint_override() {
    let admin = AdminTest::new();
    admin.run_success(&["config", "set", "endpoints.project.list", "/api/getProjects"]);

    let output = admin.run_success(&["config", "get", "endpoints.project.list", "--json"]);
    let json: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["value"], "/api/getProjects");

    // Empty value unsets
    admin.run_success(&["config", "set", "endpoints.project.list", ""]);
    let output = admin.run_success(&["config", "get", "endpoints.project.list"]);
    assert_eq!(output.trim(), "not set");
}

#[test]
fn test_config_rejects_bad_values() {
    let admin = AdminTest::new();

    let stderr = admin.run_failure(&["config", "set", "colour", "blue"]);
    assert!(stderr.contains("configuration error"));

    let stderr = admin.run_failure(&["config", "set", "page_size", "0"]);
    assert!(stderr.contains("invalid page size"));

    let stderr = admin.run_failure(&["config", "set", "base_url", "localhost"]);
    assert!(stderr.contains("invalid base_url"));

    assert!(!admin.file_exists("config.yaml"));
}

#[test]
fn test_config_show_json() {
    let admin = AdminTest::new();
    let output = admin.run_success(&["config", "show", "--json"]);
    let json: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["config"]["base_url"], "http://localhost:5000");
    assert_eq!(json["config"]["page_size"], "10");
    assert_eq!(json["authenticated"], false);
    assert!(json["config_file"].as_str().unwrap().ends_with("config.yaml"));
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn test_logout_when_not_logged_in() {
    let admin = AdminTest::new();
    let output = admin.run_success(&["logout"]);
    assert!(output.contains("Not logged in"));
}

#[test]
fn test_login_validation_fails_without_request() {
    // No server is running at the default base URL; validation must fail first
    let admin = AdminTest::new();

    let stderr = admin.run_failure(&["login", "--email", "", "--password", "secret"]);
    assert!(stderr.contains("Email is required"));

    let stderr = admin.run_failure(&["login", "--email", "not-an-email", "--password", "x"]);
    assert!(stderr.contains("Email is invalid"));

    let stderr = admin.run_failure(&["login", "--email", "admin@ownifie.com"]);
    assert!(stderr.contains("Password is required"));

    assert!(!admin.file_exists("session.yaml"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_stores_token_and_logout_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/adminLogin"))
        .and(body_json(json!({"email": "admin@ownifie.com", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "abc123", "message": "Welcome"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = AdminTest::new().with_server(server.uri());
    let output = run_async(
        &admin,
        &["login", "--email", "admin@ownifie.com", "--password", "hunter2"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Logged in as admin@ownifie.com (Welcome)"));
    assert!(admin.read_file("session.yaml").contains("abc123"));

    let output = admin.run_success(&["logout"]);
    assert!(output.contains("Logged out"));
    assert!(!admin.file_exists("session.yaml"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_rejected_by_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/adminLogin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let admin = AdminTest::new().with_server(server.uri());
    let output = run_async(&admin, &["login", "-e", "admin@ownifie.com", "-p", "wrong"]).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid credentials"));
    assert!(!admin.file_exists("session.yaml"));
}

#[test]
fn test_list_requires_login() {
    let admin = AdminTest::new();
    let stderr = admin.run_failure(&["list", "project"]);
    assert!(stderr.contains("not logged in"));
}

// ============================================================================
// List, export, bulk against a mock API
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_list_filtered_json() {
    let server = project_server().await;
    let admin = AdminTest::new().with_server(server.uri()).with_token(TOKEN);

    let output = run_async(
        &admin,
        &["list", "project", "--category", "villa", "--sort", "date", "--json"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["page"], 1);
    let ids: Vec<&str> = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p3", "p1"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_text_table() {
    let server = project_server().await;
    let admin = AdminTest::new().with_server(server.uri()).with_token(TOKEN);

    let output = run_async(&admin, &["ls", "project", "--search", "sea"]).await;
    let text = stdout(&output);
    assert!(text.contains("Sea View"));
    assert!(!text.contains("Palm Villa"));
    assert!(text.contains("Showing 1 to 1 of 1 entries"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let admin = AdminTest::new().with_server(server.uri()).with_token(TOKEN);
    let output = run_async(&admin, &["list", "blog"]).await;

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("database unavailable"));
    // Reported once, through the exit path
    assert_eq!(err.matches("database unavailable").count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_filtered_csv() {
    let server = project_server().await;
    let admin = AdminTest::new().with_server(server.uri()).with_token(TOKEN);

    let output = run_async(
        &admin,
        &["export", "project", "--status", "active", "--output", "out.csv"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Exported 1 projects"));

    let csv = admin.read_file("out.csv");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Name,Address,Type,Status,Date"));
    assert!(lines.next().unwrap().starts_with("Palm Villa,Goa,villa,active,"));
    assert_eq!(lines.next(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_activate_partial_failure() {
    let server = project_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/projects/p2/status"))
        .and(body_json(json!({"status": "active"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/projects/p3/status"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "locked"})))
        .expect(1)
        .mount(&server)
        .await;

    let admin = AdminTest::new().with_server(server.uri()).with_token(TOKEN);
    let output = run_async(
        &admin,
        &["bulk", "project", "activate", "p2", "p3", "--json"],
    )
    .await;

    assert!(!output.status.success());
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["failed"][0]["id"], "p3");
    assert!(stderr(&output).contains("1 of 2 activate requests failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_delete_needs_confirmation_without_tty() {
    let server = project_server().await;
    let admin = AdminTest::new().with_server(server.uri()).with_token(TOKEN);

    let output = run_async(&admin, &["bulk", "project", "delete", "p1"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--yes"));

    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_without_selection() {
    let admin = AdminTest::new().with_token(TOKEN);
    let output = run_async(&admin, &["bulk", "project", "activate"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no records selected"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_blog_validation_happens_first() {
    let admin = AdminTest::new().with_token(TOKEN);
    let output = run_async(&admin, &["create", "blog", "--field", "title=Hello"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("validation error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_unsupported_entity() {
    let admin = AdminTest::new().with_token(TOKEN);
    let output = run_async(&admin, &["status", "contact", "c1", "active"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not support"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let admin = AdminTest::new();
    let output = admin.run_success(&["completions", "bash"]);
    assert!(output.contains("ownifie"));
}
