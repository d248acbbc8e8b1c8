//! Local CMS stand-ins for HTTP-level tests.

use crate::config::GatewayConfig;
use axum::Router;
use nexus_schema::FallbackPolicy;
use std::time::Duration;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub(crate) async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub(crate) async fn unused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn test_config(base_url: &str) -> GatewayConfig {
    GatewayConfig::new(
        "test-token".into(),
        base_url.into(),
        1000,
        Duration::from_secs(5),
        FallbackPolicy::Lenient,
    )
    .expect("test config")
}
