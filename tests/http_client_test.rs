use ownifie_admin::entity::{EndpointOverrides, Endpoints};
use ownifie_admin::remote::{AuthClient, CollectionClient, HttpCollectionClient};
use ownifie_admin::{AdminError, RecordId, RecordStatus};
use secrecy::SecretBox;
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, collection: &str) -> HttpCollectionClient {
    HttpCollectionClient::new(
        &server.uri(),
        Endpoints::rest(collection),
        SecretBox::new(Box::new("tok".to_string())),
    )
    .unwrap()
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[tokio::test]
async fn test_fetch_all_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"_id": "p1", "projectName": "Palm Villa", "status": "active"},
                {"projectName": "missing id"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server, "projects").fetch_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_str(), "p1");
    assert_eq!(records[0].status, Some(RecordStatus::Active));
}

#[tokio::test]
async fn test_fetch_all_data_wrapper() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 7, "fullName": "Ravi"}]
        })))
        .mount(&server)
        .await;

    let records = client(&server, "contacts").fetch_all().await.unwrap();
    assert_eq!(records[0].id.as_str(), "7");
    assert_eq!(records[0].field_text("fullName").as_deref(), Some("Ravi"));
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let err = client(&server, "blogs").fetch_all().await.unwrap_err();
    assert!(err.is_server());
    match err {
        AdminError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_suggests_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/partners"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server, "partners").fetch_all().await.unwrap_err();
    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("log in again"));
}

#[tokio::test]
async fn test_network_error() {
    // Nothing listens on the discard port
    let client = HttpCollectionClient::new(
        "http://127.0.0.1:9",
        Endpoints::rest("projects"),
        SecretBox::new(Box::new("tok".to_string())),
    )
    .unwrap();
    let err = client.fetch_all().await.unwrap_err();
    assert!(err.is_network(), "got {err:?}");
}

#[tokio::test]
async fn test_mutation_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blogs"))
        .and(body_json(json!({"title": "Hi", "content": "Body", "thumbnail": "t.png"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"_id": "b9", "title": "Hi", "status": "pending"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blogs/b9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blogs/b9/status"))
        .and(body_json(json!({"status": "deactive"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/blogs/b9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, "blogs");
    let created = client
        .create(&fields(json!({"title": "Hi", "content": "Body", "thumbnail": "t.png"})))
        .await
        .unwrap();
    assert_eq!(created.id.as_str(), "b9");

    let id = RecordId::from("b9");
    // A bare acknowledgement falls back to the submitted fields
    let updated = client
        .update(&id, &fields(json!({"title": "Hello"})))
        .await
        .unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.field_text("title").as_deref(), Some("Hello"));

    client.set_status(&id, RecordStatus::Deactive).await.unwrap();
    client.delete(&id).await.unwrap();
}

#[tokio::test]
async fn test_endpoint_overrides_are_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getAllProjects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let endpoints = Endpoints::rest("projects").with_overrides(&EndpointOverrides {
        list: Some("/api/getAllProjects".to_string()),
        ..Default::default()
    });
    let client = HttpCollectionClient::new(
        &server.uri(),
        endpoints,
        SecretBox::new(Box::new("tok".to_string())),
    )
    .unwrap();
    assert!(client.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_client_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/adminLogin"))
        .and(body_json(json!({"email": "admin@ownifie.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t0k"})))
        .mount(&server)
        .await;

    let auth = AuthClient::new(&server.uri(), None).unwrap();
    let response = auth.login(" admin@ownifie.com ", "pw").await.unwrap();
    assert_eq!(response.token, "t0k");
    assert_eq!(response.message, None);
}

#[tokio::test]
async fn test_auth_client_validates_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthClient::new(&server.uri(), None).unwrap();
    let err = auth.login("not-an-email", "pw").await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_auth_client_empty_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/adminLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": ""})))
        .mount(&server)
        .await;

    let auth = AuthClient::new(&server.uri(), None).unwrap();
    assert!(auth.login("admin@ownifie.com", "pw").await.is_err());
}
