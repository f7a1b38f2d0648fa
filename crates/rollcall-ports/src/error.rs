use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("not found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}
