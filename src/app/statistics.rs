//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::RunReport;

/// Prints a one-line summary of the run.
pub fn print_run_summary(report: &RunReport) {
    info!(
        "Processed {} item{} ({} acked, {} failed; {} media, {} webpages, {} indexed in {} commit{}) in {:.1}s",
        report.total_items,
        if report.total_items == 1 { "" } else { "s" },
        report.acked,
        report.failed,
        report.media,
        report.articles,
        report.indexed,
        report.commits,
        if report.commits == 1 { "" } else { "s" },
        report.elapsed_seconds
    );
}

/// Prints error and info statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
