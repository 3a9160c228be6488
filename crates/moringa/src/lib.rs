//! Facade crate for the Moringa site backend.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! Call [`init`] once at startup and register the returned slices with
//! [`ApiState`](kernel::server::ApiState); merge [`server::router::api_router`] into the app.

use moringa_database::Database;
pub use moringa_domain as domain;
use moringa_domain::config::ApiConfig;
use moringa_domain::registry::InitializedSlice;
pub use moringa_kernel as kernel;

pub mod server {
    pub mod router {
        use moringa_kernel::server::ApiState;
        pub use moringa_kernel::server::router::system_router;
        use utoipa_axum::router::OpenApiRouter;

        /// Routes of every feature slice.
        #[must_use]
        pub fn api_router() -> OpenApiRouter<ApiState> {
            OpenApiRouter::new().merge(crate::features::contacts::router())
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use moringa_contacts as contacts;

    /// Slices compiled into this build.
    pub const ENABLED: &[&str] = &["contacts"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize every feature slice.
///
/// # Errors
/// Returns the first slice error.
pub async fn init(
    config: &ApiConfig,
    database: &Database,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let slices = vec![features::contacts::init(config, database).await?];

    tracing::info!(count = slices.len(), "Feature slices initialized");

    Ok(slices)
}
