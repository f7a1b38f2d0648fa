use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rollcall_core::ids::{ChannelId, ChatUserId, MessageId, ScheduleId, UserId};
use rollcall_core::message::Block;
use rollcall_core::schedule::Schedule;

use crate::error::PortError;
use crate::types::{CurrentOnCall, DirectoryUser, PostedMessage, WindowedOnCall};

#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// `PortError::NotFound` when the provider does not know the schedule.
    async fn get_schedule(&self, id: &ScheduleId) -> Result<Schedule, PortError>;
    /// `Ok(None)` when nobody is on call.
    async fn get_current_on_call(
        &self,
        schedule_id: &ScheduleId,
        at: DateTime<Utc>,
    ) -> Result<Option<CurrentOnCall>, PortError>;
    async fn list_schedules(&self) -> Result<Vec<Schedule>, PortError>;
    /// An empty `schedule_ids` slice means every schedule.
    async fn list_current_on_call(
        &self,
        schedule_ids: &[ScheduleId],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<WindowedOnCall>, PortError>;
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn get_user(&self, user_id: &UserId) -> Result<DirectoryUser, PortError>;
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn post_message(
        &self,
        channel: &ChannelId,
        summary_text: &str,
        blocks: &[Block],
    ) -> Result<PostedMessage, PortError>;
    async fn set_topic(&self, channel: &ChannelId, topic: &str) -> Result<(), PortError>;
    async fn pin_message(&self, channel: &ChannelId, message: &MessageId)
        -> Result<(), PortError>;
    /// `Ok(None)` when no chat account uses this email.
    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<ChatUserId>, PortError>;
}
