use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use moringa::kernel::prelude::ApiState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Moringa website API"))]
struct ApiDoc;

pub fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();
    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.config.server.body_limit_bytes);

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(moringa::server::router::system_router())
        .merge(moringa::server::router::api_router())
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/docs", api_doc);

    Router::new().merge(openapi_routes).merge(scalar_routes)
}

/// Restricts browser origins to `origins`; an empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
}
