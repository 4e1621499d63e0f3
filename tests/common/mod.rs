//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use analyst_gateway::auth::RequestContext;
use analyst_gateway::config::{
    AuthConfig, FeedConfig, ListenerConfig, Mode, ServiceConfig, StorageConfig,
};
use analyst_gateway::http::AppState;
use analyst_gateway::routing::{RouteRegistrar, RouteRegistry};
use analyst_gateway::storage::IN_MEMORY;
use analyst_gateway::{controllers, Bootstrap, Shutdown};
use axum::{extract::State, routing::get, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tempfile::TempDir;

pub const SECRET: &[u8] = b"integration-test-secret";
pub const CLIENT_ID: &str = "analyst-ui";
pub const BUCKET: &str = "analyst-bundles";
pub const LANDING_HTML: &str = "<html><body>Transit Analyst</body></html>";

/// A configuration rooted in `dir`, bound to an ephemeral loopback port.
pub fn test_config(dir: &Path, mode: Mode) -> ServiceConfig {
    let public = dir.join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), LANDING_HTML).unwrap();
    std::fs::write(public.join("app.js"), "console.log('analyst');").unwrap();

    ServiceConfig {
        mode,
        auth: AuthConfig {
            secret: URL_SAFE_NO_PAD.encode(SECRET),
            client_id: CLIENT_ID.to_string(),
        },
        listener: ListenerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: public,
        },
        storage: StorageConfig {
            database: IN_MEMORY.to_string(),
        },
        feeds: FeedConfig {
            local_cache: dir.join("cache"),
            bundle_bucket: Some(BUCKET.to_string()),
        },
    }
}

/// Sign `claims` with the test secret.
pub fn token(claims: &Value) -> String {
    token_with_secret(claims, SECRET)
}

pub fn token_with_secret(claims: &Value, secret: &[u8]) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).unwrap()
}

/// Echoes the caller's group at `/whoami`.
pub struct WhoAmI;

impl RouteRegistrar for WhoAmI {
    fn name(&self) -> &'static str {
        "whoami"
    }

    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router.route(
            "/whoami",
            get(|ctx: RequestContext| async move { ctx.group().to_string() }),
        )
    }
}

/// Reports the feed cache source at `/feeds/source`.
pub struct FeedSource;

impl RouteRegistrar for FeedSource {
    fn name(&self) -> &'static str {
        "feed-source"
    }

    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router.route(
            "/feeds/source",
            get(|State(state): State<AppState>| async move {
                state
                    .feeds
                    .remote_bucket()
                    .unwrap_or("local-only")
                    .to_string()
            }),
        )
    }
}

/// Tries to serve its own page at the landing path.
pub struct LandingOverride;

impl RouteRegistrar for LandingOverride {
    fn name(&self) -> &'static str {
        "landing-override"
    }

    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router.route("/", get(|| async { "not the landing page" }))
    }
}

pub fn test_registry() -> RouteRegistry {
    controllers::registry().with(WhoAmI).with(FeedSource)
}

/// A gateway serving in the background until dropped.
pub struct RunningGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(mode: Mode) -> RunningGateway {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), mode);

    let gateway = Bootstrap::new(config).run(test_registry()).await.unwrap();
    let addr = gateway.local_addr();
    let shutdown = Shutdown::new();
    tokio::spawn(gateway.serve(shutdown.subscribe()));

    RunningGateway {
        addr,
        shutdown,
        _dir: dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
