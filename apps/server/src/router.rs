use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use phonebook_kernel::domain::constants::{PERSONS_TAG, SYSTEM_TAG};
use phonebook_kernel::server::{ApiState, system_router, unknown_endpoint};
use phonebook_persons::persons_router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa::openapi::tag::TagBuilder;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub(crate) const DOCS_PATH: &str = "/docs";

#[derive(OpenApi)]
#[openapi(info(title = "Phonebook API", description = "People and their phone numbers"))]
struct ApiDoc;

fn api_doc() -> utoipa::openapi::OpenApi {
    let tag = |name: &str, description: &str| {
        TagBuilder::new().name(name).description(Some(description)).build()
    };

    let mut doc = ApiDoc::openapi();
    doc.tags = Some(vec![
        tag(PERSONS_TAG, "Person records"),
        tag(SYSTEM_TAG, "Service status"),
    ]);
    doc
}

pub(crate) fn init(state: ApiState) -> Router {
    let cfg = state.config.clone();

    // Separate the OpenAPI routes and the API documentation object
    let (api_routes, api_doc) = OpenApiRouter::with_openapi(api_doc())
        .merge(system_router())
        .merge(persons_router())
        .split_for_parts();

    let router = api_routes.merge(Scalar::with_url(DOCS_PATH, api_doc));

    // Static assets get the paths no route claims; misses end in the JSON 404
    let router = match &cfg.storage.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(unknown_endpoint.into_service()),
        ),
        None => router.fallback(unknown_endpoint),
    };

    // A known path with the wrong method is still an unknown endpoint
    let router = router.method_not_allowed_fallback(unknown_endpoint);

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if cfg.server.cors { router.layer(CorsLayer::permissive()) } else { router }
}
