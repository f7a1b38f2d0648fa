use rollcall_core::ids::ScheduleId;
use rollcall_ports::error::PortError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no data available: all {} schedule lookups failed", .failures.len())]
    ResolutionExhausted { failures: Vec<ScheduleLookupFailure> },
}

/// One schedule that could not be resolved; the others still are.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("schedule {schedule_id}: {error}")]
pub struct ScheduleLookupFailure {
    pub schedule_id: ScheduleId,
    pub error: PortError,
}
