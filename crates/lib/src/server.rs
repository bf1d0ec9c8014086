//! Webhook listener: every request on the bound socket goes through [`Bot::handle`].

use crate::bot::{Bot, InboundRequest, WebhookResponse};
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderMap, Method},
    Router,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Router that sends every path and method to the webhook pipeline.
/// No body size limit: every delivery must reach the pipeline and be acknowledged.
pub fn router(bot: Arc<Bot>) -> Router {
    Router::new()
        .fallback(webhook)
        .layer(DefaultBodyLimit::disable())
        .with_state(bot)
}

/// Bind to the configured address and serve until SIGINT/SIGTERM.
pub async fn run_server(config: &ServerConfig, bot: Arc<Bot>) -> Result<()> {
    let bind_addr = format!("{}:{}", config.bind.trim(), config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("webhook listening on {}", bind_addr);
    serve(listener, bot, shutdown_signal()).await?;
    log::info!("webhook listener stopped");
    Ok(())
}

/// Serve on an already-bound listener until `shutdown` completes. In-flight requests are drained.
pub async fn serve<F>(listener: TcpListener, bot: Arc<Bot>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(bot))
        .with_graceful_shutdown(shutdown)
        .await
        .context("webhook server exited")
}

async fn webhook(
    State(bot): State<Arc<Bot>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse {
    bot.handle(InboundRequest {
        method,
        query,
        headers,
        body,
    })
}

/// Future that completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining webhook requests");
}
