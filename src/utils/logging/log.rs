//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages
//! and file operations.

use std::path::Path;
use std::time::Duration;

/// Log the start of a pipeline stage
///
/// # Arguments
/// * `stage` - Name of the stage
/// * `items` - Number of input items
pub fn log_stage_start(stage: &str, items: usize) {
    log::info!("{stage}: starting with {items} items");
}

/// Log the completion of a pipeline stage
///
/// # Arguments
/// * `stage` - Name of the stage
/// * `items` - Number of output items
/// * `elapsed` - Time spent in the stage
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Duration) {
    log::info!("{stage}: produced {items} items in {elapsed:?}");
}

/// Log a file operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log a file operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file that was operated on
/// * `items` - Number of rows processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} rows at {} in {:?}",
            operation,
            items,
            path.display(),
            duration
        );
    } else {
        log::info!("Successfully {} {} rows at {}", operation, items, path.display());
    }
}

/// Log a data-quality warning
///
/// # Arguments
/// * `message` - Warning message
/// * `count` - Number of affected records, if known
pub fn log_warning(message: &str, count: Option<usize>) {
    if let Some(count) = count {
        log::warn!("{message} ({count} records)");
    } else {
        log::warn!("{message}");
    }
}
