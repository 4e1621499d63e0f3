//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize all subsystems in dependency order
//! - Bind the listener, install the gate, then register routes
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried
//! - Subsystems initialize in order, not concurrently
//! - Routes are registered only beneath an installed gate

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::auth::{AuthorizationGate, CredentialVerifier};
use crate::config::loader::ConfigError;
use crate::config::validation::validate_config;
use crate::config::ServiceConfig;
use crate::feeds::{FeedCache, FeedCacheError};
use crate::http::{AppState, GatedRouter, HttpServer, RouteConflict};
use crate::net::listener::{self, ListenerError};
use crate::routing::RouteRegistry;
use crate::storage::{Storage, StorageError};

/// A completed startup stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    ConfigResolved,
    VerifierReady,
    StorageConnected,
    FeedCacheReady,
    ListenerBound,
    GateInstalled,
    Registered(&'static str),
    Ready,
}

/// Stages in the order they completed.
#[derive(Debug, Clone, Default)]
pub struct StartupTrace {
    stages: Vec<Stage>,
}

impl StartupTrace {
    fn record(&mut self, stage: Stage) {
        tracing::debug!(?stage, "Startup stage complete");
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Index of the first stage matching `stage`.
    pub fn position(&self, stage: &Stage) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }
}

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid verifier secret: {0}")]
    Verifier(#[source] base64::DecodeError),

    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("feed cache unavailable: {0}")]
    FeedCache(#[from] FeedCacheError),

    #[error("listener unavailable: {0}")]
    Bind(#[from] ListenerError),

    #[error("route registration failed: {0}")]
    Routes(#[from] RouteConflict),
}

/// One-shot startup sequencer.
pub struct Bootstrap {
    config: ServiceConfig,
}

impl Bootstrap {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Bring every subsystem up in order and return a gateway ready to serve.
    pub async fn run(self, registry: RouteRegistry) -> Result<Gateway, BootstrapError> {
        let mut trace = StartupTrace::default();

        validate_config(&self.config).map_err(ConfigError::Validation)?;
        let config = Arc::new(self.config);
        tracing::info!(mode = %config.mode, "Starting analyst gateway");
        trace.record(Stage::ConfigResolved);

        // Constructed in offline mode too; the gate simply never calls it.
        let verifier =
            CredentialVerifier::from_config(&config.auth).map_err(BootstrapError::Verifier)?;
        let verifier = Arc::new(verifier);
        trace.record(Stage::VerifierReady);

        tracing::info!(database = %config.storage.database, "Connecting to database");
        let storage = Storage::connect(&config.storage)?;
        tracing::info!(database = storage.location(), "Database connected");
        trace.record(Stage::StorageConnected);

        let remote_bucket = if config.mode.is_offline() {
            None
        } else {
            config.feeds.bundle_bucket.as_deref()
        };
        let feeds = Arc::new(FeedCache::initialize(
            &config.feeds.local_cache,
            remote_bucket,
        )?);
        tracing::info!(
            local_cache = %feeds.local_dir().display(),
            remote_bucket = feeds.remote_bucket().unwrap_or("<none>"),
            local_only = feeds.is_local_only(),
            "Feed cache ready"
        );
        trace.record(Stage::FeedCacheReady);

        tracing::info!("Starting server");
        let tcp = listener::bind(&config.listener).await?;
        trace.record(Stage::ListenerBound);

        let gate = Arc::new(AuthorizationGate::new(config.mode, verifier));
        let mut router = GatedRouter::install(gate, &config.listener.static_dir);
        trace.record(Stage::GateInstalled);

        for registrar in registry.iter() {
            router.register(registrar)?;
            trace.record(Stage::Registered(registrar.name()));
        }

        let state = AppState {
            config,
            storage,
            feeds,
        };
        let server = HttpServer::new(tcp, router.finish(state));
        let address = server
            .local_addr()
            .map_err(|source| ListenerError::Bind {
                address: "<bound listener>".to_string(),
                source,
            })?;

        trace.record(Stage::Ready);
        tracing::info!(address = %address, "Transit analyst gateway is ready");

        Ok(Gateway {
            server,
            address,
            trace,
        })
    }
}

/// A fully initialized gateway, bound but not yet serving.
pub struct Gateway {
    server: HttpServer,
    address: SocketAddr,
    trace: StartupTrace,
}

impl Gateway {
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    pub fn trace(&self) -> &StartupTrace {
        &self.trace
    }

    /// Serve requests until `shutdown` fires.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        self.server.run(shutdown).await
    }
}
