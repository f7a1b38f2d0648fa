use std::time::Duration;

use rollcall_ports::error::PortError;

pub(crate) fn client(timeout: Duration) -> Result<reqwest::Client, PortError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PortError::Connection(e.to_string()))
}

pub(crate) fn transport_error(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Timeout
    } else if e.is_decode() {
        PortError::Decode(e.to_string())
    } else {
        PortError::Connection(e.to_string())
    }
}
