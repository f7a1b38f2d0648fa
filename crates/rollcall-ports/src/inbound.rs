use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rollcall_core::channel::ChannelConfig;

use crate::types::RunOutcome;

/// Entry point the scheduler fires for each channel. A run never errors;
/// failures are reported through the outcome.
#[async_trait]
pub trait ChannelRunner: Send + Sync {
    async fn run(&self, channel: &ChannelConfig, as_of: DateTime<Utc>) -> RunOutcome;
}
