use crate::handlers;
use moringa_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Contact form routes (`/api/contacts`, `/api/stats`).
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::submit_contact, handlers::list_contacts))
        .routes(routes!(handlers::stats))
}
