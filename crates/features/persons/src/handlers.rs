use crate::Persons;
use crate::error::{ErrorBody, PersonsError};
use crate::model::{Person, PersonPayload};
use crate::service::PersonService;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequestParts, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Html;
use phonebook_domain::constants::{PERSONS_TAG, SYSTEM_TAG};
use phonebook_kernel::server::ApiState;
use tracing::debug;

impl FromRequestParts<ApiState> for PersonService {
    type Rejection = PersonsError;

    async fn from_request_parts(_parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        state
            .slice::<Persons>()
            .map(|slice| slice.service.clone())
            .map_err(|e| PersonsError::from(e.to_string()))
    }
}

/// A body that is not a JSON object counts as missing content.
fn payload(body: Result<Json<PersonPayload>, JsonRejection>) -> Result<PersonPayload, PersonsError> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        debug!(%rejection, "Unreadable person body");
        PersonsError::ContentMissing { fields: Vec::new() }
    })
}

/// An id segment that cannot even be decoded is as malformed as one that does not parse.
fn person_id(path: Result<Path<String>, PathRejection>) -> Result<String, PersonsError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        debug!(%rejection, "Undecodable person id");
        PersonsError::MalformedId { raw: rejection.body_text() }
    })
}

#[utoipa::path(
    get,
    path = "/api/persons",
    responses(
        (status = OK, description = "All persons, ascending by id", body = Vec<Person>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorBody),
    ),
    tag = PERSONS_TAG,
)]
pub(crate) async fn list_persons(service: PersonService) -> Result<Json<Vec<Person>>, PersonsError> {
    service.list().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/persons/{id}",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = OK, description = "The person", body = Person),
        (status = BAD_REQUEST, description = "Unknown or malformed id", body = ErrorBody),
    ),
    tag = PERSONS_TAG,
)]
pub(crate) async fn get_person(
    service: PersonService,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Person>, PersonsError> {
    let id = person_id(id)?;
    service.get(&id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/persons",
    request_body = PersonPayload,
    responses(
        (status = OK, description = "The created person", body = Person),
        (status = BAD_REQUEST, description = "Missing, malformed or duplicate fields", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorBody),
    ),
    tag = PERSONS_TAG,
)]
pub(crate) async fn create_person(
    service: PersonService,
    body: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<Json<Person>, PersonsError> {
    let payload = payload(body)?;
    service.create(&payload).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/api/persons/{id}",
    params(("id" = String, Path, description = "Person id")),
    request_body = PersonPayload,
    responses(
        (status = OK, description = "The updated person", body = Person),
        (status = BAD_REQUEST, description = "Unknown id or rejected fields", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorBody),
    ),
    tag = PERSONS_TAG,
)]
pub(crate) async fn update_person(
    service: PersonService,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<Json<Person>, PersonsError> {
    let id = person_id(id)?;
    let payload = payload(body)?;
    service.update(&id, &payload).await.map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/persons/{id}",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = NO_CONTENT, description = "Person deleted"),
        (status = BAD_REQUEST, description = "Unknown or malformed id", body = ErrorBody),
    ),
    tag = PERSONS_TAG,
)]
pub(crate) async fn delete_person(
    service: PersonService,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, PersonsError> {
    let id = person_id(id)?;
    service.delete(&id).await.map(|_| StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/info",
    responses((status = OK, description = "Record count and server time", body = String, content_type = "text/html")),
    tag = SYSTEM_TAG,
)]
pub(crate) async fn info(service: PersonService) -> Result<Html<String>, PersonsError> {
    let count = service.count().await?;
    let now = chrono::Local::now().format("%a %b %d %Y %H:%M:%S GMT%z");
    Ok(Html(format!("<h3>Phonebook has info for {count} people</h3> <h3>{now}</h3>")))
}
