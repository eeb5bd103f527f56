//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Logs how many items have been settled so far and the rate.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `completed` - Items acked by the expander
/// * `failed` - Items failed after their last redelivery
pub fn log_progress(
    start_time: std::time::Instant,
    completed: &Arc<AtomicUsize>,
    failed: &Arc<AtomicUsize>,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = completed.load(Ordering::SeqCst);
    let failed = failed.load(Ordering::SeqCst);
    let settled = completed + failed;
    let rate = if elapsed_secs > 0.0 {
        settled as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Settled {} items ({} acked, {} failed) in {:.2} seconds (~{:.2} items/sec)",
        settled, completed, failed, elapsed_secs, rate
    );
}
