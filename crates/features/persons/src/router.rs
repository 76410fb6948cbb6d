use crate::handlers;
use phonebook_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Person CRUD routes plus the `/info` summary page.
pub fn persons_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_persons, handlers::create_person))
        .routes(routes!(handlers::get_person, handlers::update_person, handlers::delete_person))
        .routes(routes!(handlers::info))
}
