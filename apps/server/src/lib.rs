//! # Moringa Server
//!
//! HTTP backend of the Moringa website: the contact form API on `Axum`, stored in `SurrealDB`.
//!
//! ## Example
//! ```no_run
//! use moringa_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

pub mod router;
mod shutdown;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use moringa::domain::config::{ApiConfig, SslConfig};
use moringa::kernel::server::ApiState;
use moringa_database::DatabaseBuilder;
use std::fmt;
use std::net::SocketAddr;
use tracing::{info, warn};

/// Collects the configuration for a [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Overrides `server.port`.
    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Prepares everything the server needs before it binds a socket.
    ///
    /// Loads the TLS material (if configured), connects to the database and
    /// migrates it, then initializes the feature slices.
    ///
    /// # Errors
    /// * TLS certificate or key missing or unreadable
    /// * database unreachable, credentials rejected, or a migration conflict
    /// * unusable mail settings (invalid mailbox, relay host)
    pub async fn build(self) -> Result<Server> {
        let tls = match &self.cfg.server.ssl {
            Some(ssl) => Some(load_tls(ssl).await?),
            None => None,
        };

        info!(address = %bind_address(&self.cfg), tls = tls.is_some(), "Initializing server");

        let db = DatabaseBuilder::from_config(&self.cfg.database)
            .init()
            .await
            .context("Failed to establish database connection")?;

        let slices = moringa::init(&self.cfg, &db)
            .await
            .map_err(|e| anyhow!("Feature bootstrap failed: {e}"))?;

        let state = ApiState::builder()
            .config(self.cfg)
            .db(db)
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;

        Ok(Server { state, tls })
    }
}

async fn load_tls(ssl: &SslConfig) -> Result<RustlsConfig> {
    if !ssl.cert.exists() {
        anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
    }
    if !ssl.key.exists() {
        anyhow::bail!("SSL key not found at: {}", ssl.key.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = ssl.key.metadata()?.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(key = %ssl.key.display(), mode = %format!("{mode:o}"), "SSL private key is readable by others");
        }
    }

    RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
        .await
        .context("Failed to load SSL/TLS certificates")
}

fn bind_address(cfg: &ApiConfig) -> SocketAddr {
    SocketAddr::new(cfg.server.address, cfg.server.port)
}

/// An initialized server: state built, database migrated, TLS loaded.
#[must_use = "call .run().await to start the server"]
pub struct Server {
    state: ApiState,
    tls: Option<RustlsConfig>,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("state", &self.state).field("tls", &self.tls.is_some()).finish()
    }
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, without binding a socket.
    pub fn app(&self) -> Router {
        router::init(self.state.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Serves HTTP (or HTTPS) until SIGINT/SIGTERM, then drains in-flight requests.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or the listener fails.
    pub async fn run(self) -> Result<()> {
        let address = bind_address(&self.state.config);
        let app = self.app().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        shutdown::watch(handle.clone());

        match self.tls {
            Some(tls) => {
                info!("Listening on https://{address}");
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTPS server failed")?;
            },
            None => {
                info!("Listening on http://{address}");
                axum_server::bind(address).handle(handle).serve(app).await.context("HTTP server failed")?;
            },
        }

        info!("Server shutdown complete");
        Ok(())
    }
}
