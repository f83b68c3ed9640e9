use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::AppState;
use crate::users;

/// Time left for abandoned calls to flush their 503 before the server task is aborted.
const ABANDON_GRACE: Duration = Duration::from_secs(1);

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(users::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "rpc_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Serve until `shutdown` resolves, then stop accepting and give in-flight
/// calls up to `drain_timeout`. Calls still running at the deadline are
/// dropped, which releases any pool connection they hold, and answered 503.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (abandon_tx, abandon_rx) = watch::channel(false);
    let app = app.layer(middleware::from_fn_with_state(
        abandon_rx,
        abandon_after_deadline,
    ));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            // listener died before any shutdown was requested
            res??;
            return Ok(());
        }
        _ = shutdown => {}
    }

    info!(timeout = ?drain_timeout, "shutdown requested, draining in-flight calls");
    let _ = stop_tx.send(());

    if let Ok(res) = tokio::time::timeout(drain_timeout, &mut server).await {
        res??;
        return Ok(());
    }

    warn!("drain deadline elapsed, abandoning in-flight calls");
    let _ = abandon_tx.send(true);
    match tokio::time::timeout(ABANDON_GRACE, &mut server).await {
        Ok(res) => res??,
        Err(_) => {
            warn!("connections still open after abandoning calls, aborting server");
            server.abort();
        }
    }
    Ok(())
}

/// Races each call against the drain deadline; losing drops the handler future.
async fn abandon_after_deadline(
    State(mut abandon): State<watch::Receiver<bool>>,
    req: Request,
    next: Next,
) -> Response {
    let deadline = async move {
        while !*abandon.borrow_and_update() {
            if abandon.changed().await.is_err() {
                // serve already returned; never fires
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        res = next.run(req) => res,
        _ = deadline => {
            warn!("call abandoned at shutdown deadline");
            (StatusCode::SERVICE_UNAVAILABLE, "server shutting down").into_response()
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
}
