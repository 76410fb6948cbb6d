//! # Phonebook Server
//!
//! The phonebook REST API: `Axum` in front of the persons slice, with the records kept in
//! `SurrealDB` (or in process memory when `database.url` is `memory`).
//!
//! ## Example
//! ```no_run
//! use phonebook_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(3001)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, bail};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use phonebook_kernel::domain::config::{ApiConfig, SslConfig};
use phonebook_kernel::server::ApiState;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

pub use phonebook_kernel::domain::constants::IN_PROCESS_STORE;

/// In-flight requests get this long to finish once shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Collects the configuration a [`Server`] is built from.
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

    /// Opens storage and assembles the application state.
    ///
    /// Paths named by the config (TLS files, static directory) are checked before any
    /// connection is made, so a typo fails fast instead of after a database warm-up.
    ///
    /// # Errors
    /// Returns an error if a configured path is missing, or if connecting to
    /// `SurrealDB` or applying the persons schema fails.
    pub async fn build(self) -> Result<Server> {
        preflight(&self.cfg)?;

        info!(database = %self.cfg.database.url, "Opening phonebook storage");
        let (service, db) = phonebook_persons::connect(&self.cfg.database)
            .await
            .context("Failed to open phonebook storage")?;

        let mut state =
            ApiState::builder().config(self.cfg).register_slice(phonebook_persons::init(service));
        if let Some(db) = db {
            state = state.db(db);
        }

        Ok(Server { state: state.build().context("Failed to assemble API state")? })
    }
}

fn preflight(cfg: &ApiConfig) -> Result<()> {
    if let Some(ssl) = &cfg.server.ssl {
        check_tls_files(ssl)?;
    }
    if let Some(dir) = cfg.storage.static_dir.as_deref().filter(|dir| !dir.is_dir()) {
        bail!("Static directory not found at: {}", dir.display());
    }
    Ok(())
}

fn check_tls_files(ssl: &SslConfig) -> Result<()> {
    for (what, path) in [("certificate", &ssl.cert), ("key", &ssl.key)] {
        if !path.exists() {
            bail!("SSL {what} not found at: {}", path.display());
        }
    }
    warn_if_key_readable(&ssl.key)
}

#[cfg(unix)]
fn warn_if_key_readable(key: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = key.metadata().context("Reading SSL key metadata")?.permissions().mode();
    if mode & 0o077 != 0 {
        warn!(key = %key.display(), mode = %format!("{mode:o}"), "SSL private key is readable by others");
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn warn_if_key_readable(_key: &Path) -> Result<()> {
    Ok(())
}

/// A phonebook API ready to listen.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, without a listener attached.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Serves HTTP, or HTTPS when `server.ssl` is set, until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Returns an error if binding fails or the TLS material cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        let app = self.router().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone()));

        match &cfg.server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                info!("Phonebook listening on https://{address}");
                axum_server::bind_rustls(address, tls).handle(handle).serve(app).await
            },
            None => {
                info!("Phonebook listening on http://{address}");
                axum_server::bind(address).handle(handle).serve(app).await
            },
        }
        .with_context(|| format!("Server on {address} failed"))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn drain_on_signal(handle: Handle<SocketAddr>) {
    match shutdown_signal().await {
        Ok(()) => {
            info!(timeout = ?DRAIN_TIMEOUT, "Shutdown requested, draining connections");
            handle.graceful_shutdown(Some(DRAIN_TIMEOUT));
        },
        Err(e) => error!("Cannot listen for shutdown signals: {e:#}"),
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("Failed to install SIGTERM handler")?;
    tokio::select! {
        res = signal::ctrl_c() => res.context("Failed to wait for Ctrl+C"),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    signal::ctrl_c().await.context("Failed to wait for Ctrl+C")
}
