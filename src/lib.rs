//! Proctor -- a continuous health-exam scheduler.
//!
//! A battery of named exams runs forever, each on its own interval, with
//! outcomes kept in a bounded in-memory history and served over a small
//! HTTP query API.

pub mod api;
pub mod battery;
pub mod checks;
pub mod notify;
pub mod scheduler;

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Start the proctor daemon: exam scheduler plus the query API server.
///
/// Preflight runs before anything is scheduled or bound; a failure there
/// aborts startup entirely.
pub async fn serve(bind: &str, config: &str) -> Result<()> {
    let battery = Arc::new(battery::Battery::from_path(config)?);
    let registry = Arc::new(checks::CheckRegistry::from_battery(&battery)?);
    scheduler::preflight(&battery, &registry)?;

    let store = Arc::new(scheduler::HistoryStore::new(battery.history_len()));
    let dispatcher = Arc::new(notify::Dispatcher::from_battery(&battery));

    let cancel = CancellationToken::new();

    let exam_scheduler = scheduler::Scheduler::new(
        Arc::clone(&battery),
        registry,
        Arc::clone(&store),
    )
    .with_dispatcher(dispatcher);

    let scheduler_cancel = cancel.clone();
    let scheduler_task =
        tokio::spawn(async move { exam_scheduler.run(scheduler_cancel).await });

    let app = api::router(api::state::AppState { store });

    let addr: std::net::SocketAddr = bind.parse()?;
    tracing::info!(
        %addr,
        exams = battery.exams.len(),
        history_len = battery.history_len(),
        "proctor listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await?;

    // The server only exits once the token fired; wait for the exam loops
    // to drain before returning.
    cancel.cancel();
    scheduler_task.await??;

    Ok(())
}
