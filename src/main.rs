//! Demo service built on the request context engine.
//!
//! ```text
//!     Client Request
//!     ───────────────▶ axum (trace, request id, timeout, limit)
//!                          │
//!                          ▼
//!                      Engine::serve ──▶ pooled Context
//!                                            │ middleware … handlers
//!                                            ▼
//!     Client Response ◀── ResponseWriter (status once, bcode header)
//! ```
//!
//! Routes:
//! - `GET /ping`: JSON envelope with `"pong"`
//! - `GET /users/:id`: echoes the route parameter and client IP
//! - `POST /users`: binds and validates a signup body
//! - `GET /legacy`: legacy `code||message` envelope

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use validator::Validate;

use request_context::config::{build_settings, load_config, ConfigWatcher};
use request_context::ecode::Ecode;
use request_context::observability::{logging, metrics};
use request_context::{handler, Engine, HttpServer, ServerConfig, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "request-context", version, about = "Request context demo server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
struct Signup {
    #[validate(length(min = 3, max = 32))]
    name: String,
    #[validate(email)]
    email: String,
}

fn build_engine(config: &ServerConfig) -> Result<Engine, Box<dyn std::error::Error>> {
    let mut engine = Engine::from_config(config)?;

    engine.use_middleware(handler(|ctx| {
        let start = Instant::now();
        ctx.next();
        tracing::debug!(
            route = ctx.route_path(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "handler chain finished"
        );
    }));

    engine
        .get("/ping", [handler(|ctx| ctx.json("pong", None))])
        .get(
            "/users/:id",
            [handler(|ctx| {
                let id = ctx.param("id").unwrap_or_default().to_string();
                let ip = ctx.remote_ip();
                ctx.json(json!({ "id": id, "remote_ip": ip }), None);
            })],
        )
        .post(
            "/users",
            [handler(|ctx| {
                let Ok(signup) = ctx.bind::<Signup>() else {
                    return;
                };
                ctx.json(signup, None);
            })],
        )
        .get(
            "/legacy",
            [handler(|ctx| {
                ctx.json(
                    json!([]),
                    Some(Ecode::with_message(-4001, "4001||Invalid input").into()),
                )
            })],
        );

    Ok(engine)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("request-context v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(error) => tracing::error!(
                %error,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = Arc::new(build_engine(&config)?);

    // Keep the watcher handle alive for the lifetime of the server.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                while let Some(config) = updates.recv().await {
                    match build_settings(&config) {
                        Ok(settings) => engine.update_settings(settings),
                        Err(error) => tracing::error!(%error, "reloaded settings rejected"),
                    }
                }
            });
            Some(handle)
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown.clone().listen_for_ctrl_c());

    HttpServer::new(engine, &config, shutdown).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
