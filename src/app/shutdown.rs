//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Stops the progress logger and waits for it to exit.
///
/// Workers and dispatchers stop on their own once their input channels close.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }
}
