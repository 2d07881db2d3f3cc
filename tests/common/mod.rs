//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use request_context::{Engine, HttpServer, ServerConfig, Shutdown};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Serve `engine` with the default configuration.
pub async fn start(engine: Engine) -> TestServer {
    start_with_config(engine, ServerConfig::default()).await
}

/// Serve `engine` with `config`; the bind address is ignored.
pub async fn start_with_config(engine: Engine, config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(engine), &config, shutdown.clone());
    let handle = tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });
    TestServer {
        addr,
        shutdown,
        handle,
    }
}
