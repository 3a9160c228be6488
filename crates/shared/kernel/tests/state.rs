use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use moringa_database::Database;
use moringa_kernel::prelude::*;
use moringa_kernel::server::router::system_router;
use std::any::Any;
use tower::ServiceExt;

#[derive(Debug)]
struct Greeter {
    greeting: &'static str,
}

impl FeatureSlice for Greeter {
    fn name(&self) -> &'static str {
        "greeter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

async fn memory_db() -> Database {
    Database::builder().url("mem://").session("kernel", "state").init().await.expect("mem db")
}

#[tokio::test]
async fn registered_slices_are_retrievable() {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(memory_db().await)
        .register_slice(InitializedSlice::new(Greeter { greeting: "hello" }))
        .build()
        .expect("state");

    assert_eq!(state.try_get_slice::<Greeter>().expect("slice").greeting, "hello");
    assert_eq!(state.slice_names().collect::<Vec<_>>(), vec!["greeter"]);
}

#[tokio::test]
async fn missing_slice_is_reported() {
    let state =
        ApiState::builder().config(ApiConfig::default()).db(memory_db().await).build().expect("state");

    let err = state.try_get_slice::<Greeter>().unwrap_err();
    assert!(matches!(err, ApiStateError::MissingSlice { .. }));
}

#[tokio::test]
async fn builder_requires_database() {
    let err = ApiState::builder().config(ApiConfig::default()).build().unwrap_err();
    assert!(matches!(err, ApiStateError::Validation { .. }));
}

#[tokio::test]
async fn health_route_reports_up_without_caching() {
    let (router, _api) = system_router::<()>().split_for_parts();

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store, no-cache, must-revalidate")
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(json["status"], "up");
}
