use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use phonebook_kernel::domain::config::ApiConfig;
use phonebook_kernel::server::{ApiState, system_router, unknown_endpoint};
use phonebook_persons::{
    ApprovedPerson, MemoryPersonStore, Person, PersonId, PersonService, PersonStore, StoreError,
    init, persons_router,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    app_over(MemoryPersonStore::new())
}

fn app_over(store: impl PersonStore + 'static) -> Router {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(init(PersonService::new(store)))
        .build()
        .expect("state");

    let (router, _api) = system_router().merge(persons_router()).split_for_parts();
    router
        .fallback(unknown_endpoint)
        .method_not_allowed_fallback(unknown_endpoint)
        .with_state(state)
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("utf-8 body")
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        },
        None => Body::empty(),
    };

    let response =
        app.clone().oneshot(request.body(body).expect("request")).await.expect("response");
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body").to_vec();
    Reply { status, content_type, body }
}

async fn create(app: &Router, name: &str, number: &str) -> Reply {
    send(app, Method::POST, "/api/persons", Some(json!({ "name": name, "number": number }))).await
}

#[tokio::test]
async fn first_person_gets_id_one() {
    let app = app();
    let reply = create(&app, "Ada Lovelace", "3944532352").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "id": "1", "name": "Ada Lovelace", "number": "3944532352" }));
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;
    let reply = create(&app, "Ada Lovelace", "1234567890").await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "name must be unique" }));
}

#[tokio::test]
async fn duplicate_number_is_rejected() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;
    let reply = create(&app, "Dan Abramov", "3944532352").await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "duplicate phone number" }));
}

#[tokio::test]
async fn missing_content_is_rejected() {
    let app = app();
    let reply = send(&app, Method::POST, "/api/persons", Some(json!({ "name": "Ada" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "content missing" }));

    let reply = send(&app, Method::POST, "/api/persons", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "content missing" }));
}

#[tokio::test]
async fn update_with_digit_in_name_reports_field() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;
    let reply = send(
        &app,
        Method::PUT,
        "/api/persons/1",
        Some(json!({ "name": "A1", "number": "3944532352" })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "format validation error", "fields": ["name"] }));
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_id() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;
    let reply = send(
        &app,
        Method::PUT,
        "/api/persons/1",
        Some(json!({ "name": "Ada King", "number": "3944532352" })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "id": "1", "name": "Ada King", "number": "3944532352" }));
}

#[tokio::test]
async fn get_is_idempotent() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;

    let first = send(&app, Method::GET, "/api/persons/1", None).await;
    let second = send(&app, Method::GET, "/api/persons/1", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn deleted_person_is_gone() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;

    let reply = send(&app, Method::DELETE, "/api/persons/1", None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert!(reply.body.is_empty());

    let reply = send(&app, Method::GET, "/api/persons/1", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "person not found" }));

    let reply = send(&app, Method::DELETE, "/api/persons/1", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({ "error": "person not found" }));
}

#[tokio::test]
async fn malformed_id_is_rejected() {
    let app = app();
    for method in [Method::GET, Method::DELETE] {
        let reply = send(&app, method, "/api/persons/not-an-id", None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json(), json!({ "error": "malformatted id" }));
    }
}

#[tokio::test]
async fn list_returns_records_in_id_order() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;
    create(&app, "Dan Abramov", "1243234345").await;

    let reply = send(&app, Method::GET, "/api/persons", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!([
            { "id": "1", "name": "Ada Lovelace", "number": "3944532352" },
            { "id": "2", "name": "Dan Abramov", "number": "1243234345" },
        ])
    );
}

#[tokio::test]
async fn info_counts_people() {
    let app = app();
    create(&app, "Ada Lovelace", "3944532352").await;

    let reply = send(&app, Method::GET, "/info", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.content_type.as_deref().is_some_and(|ct| ct.starts_with("text/html")));
    assert!(reply.text().starts_with("<h3>Phonebook has info for 1 people</h3> <h3>"));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let reply = send(&app(), Method::GET, "/api/people", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({ "error": "unknown endpoint" }));
}

#[tokio::test]
async fn wrong_method_on_collection_is_json_404() {
    let app = app();
    for method in [Method::PATCH, Method::DELETE] {
        let reply = send(&app, method.clone(), "/api/persons", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(reply.json(), json!({ "error": "unknown endpoint" }));
    }
}

#[tokio::test]
async fn undecodable_id_is_malformed() {
    let app = app();
    for method in [Method::GET, Method::DELETE] {
        let reply = send(&app, method.clone(), "/api/persons/%FF", None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(reply.json(), json!({ "error": "malformatted id" }));
    }

    let body = json!({ "name": "Ada", "number": "0123456789" });
    let reply = send(&app, Method::PUT, "/api/persons/%FF", Some(body)).await;
    assert_eq!(reply.json(), json!({ "error": "malformatted id" }));
}

#[derive(Debug)]
struct BrokenStore;

#[async_trait]
impl PersonStore for BrokenStore {
    async fn list(&self) -> Result<Vec<Person>, StoreError> {
        Err("disk on fire".into())
    }

    async fn get(&self, _id: PersonId) -> Result<Option<Person>, StoreError> {
        Err("disk on fire".into())
    }

    async fn find_by_name(
        &self,
        _name: &str,
        _excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        Ok(None)
    }

    async fn find_by_number(
        &self,
        _number: &str,
        _excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        Ok(None)
    }

    async fn insert(&self, _person: &ApprovedPerson) -> Result<Person, StoreError> {
        Err("disk on fire".into())
    }

    async fn update(
        &self,
        _id: PersonId,
        _person: &ApprovedPerson,
    ) -> Result<Option<Person>, StoreError> {
        Err("disk on fire".into())
    }

    async fn delete(&self, _id: PersonId) -> Result<Option<Person>, StoreError> {
        Err("disk on fire".into())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Err("disk on fire".into())
    }
}

#[tokio::test]
async fn storage_fault_hides_details() {
    let app = app_over(BrokenStore);

    let listed = send(&app, Method::GET, "/api/persons", None).await;
    assert_eq!(listed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(listed.json(), json!({ "error": "Something went wrong" }));

    let created = create(&app, "Ada Lovelace", "3944532352").await;
    assert_eq!(created.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!created.text().contains("disk on fire"));
}
