use std::time::Duration;

use tracing::info;
use tracing::warn;

use crate::error::LifecycleResult;
use crate::resource::OperationOutcome;

pub const TELEMETRY_TARGET: &str = "agentkit::telemetry";

/// Emit a telemetry log for a completed lifecycle operation.
pub fn record_operation(
    operation: &'static str,
    resource: &str,
    duration: Duration,
    outcome: &OperationOutcome,
) {
    let duration_ms = duration_ms(duration);
    let label = outcome.label();
    if let OperationOutcome::Failed(cause) = outcome {
        warn!(
            target: TELEMETRY_TARGET,
            event = "lifecycle_operation",
            operation,
            resource,
            outcome = label,
            status = cause.status(),
            duration_ms,
        );
    } else {
        info!(
            target: TELEMETRY_TARGET,
            event = "lifecycle_operation",
            operation,
            resource,
            outcome = label,
            duration_ms,
        );
    }
}

/// Like [`record_operation`], but also covers transport and decode errors
/// raised after the target resource was identified.
pub fn record_result(
    operation: &'static str,
    resource: &str,
    duration: Duration,
    result: &LifecycleResult<OperationOutcome>,
) {
    match result {
        Ok(outcome) => record_operation(operation, resource, duration, outcome),
        Err(err) => warn!(
            target: TELEMETRY_TARGET,
            event = "lifecycle_operation",
            operation,
            resource,
            outcome = "error",
            error = %err,
            duration_ms = duration_ms(duration),
        ),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
