use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("invalid time zone: {0}")]
    InvalidTimeZone(String),
    #[error("unknown posting mode: {0}")]
    UnknownPostingMode(String),
    #[error("channel requires at least one schedule")]
    ChannelRequiresSchedule,
    #[error("invalid shift period")]
    InvalidShiftPeriod,
}
