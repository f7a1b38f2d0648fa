use serde::Serialize;

use rollcall_core::ids::{ChannelId, MessageId, ScheduleId, UserId};
use rollcall_core::schedule::Shift;

/// A directory entry; either field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// The provider's answer to "who is on call for this schedule right now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentOnCall {
    pub user_id: UserId,
    /// Present when the provider embedded the user in the same response.
    pub user: Option<DirectoryUser>,
    pub shift: Option<Shift>,
}

/// One entry of a windowed on-call listing across schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedOnCall {
    pub schedule_id: ScheduleId,
    pub schedule_name: Option<String>,
    pub user_id: Option<UserId>,
    pub user: Option<DirectoryUser>,
    pub shift: Option<Shift>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStep {
    Resolve,
    PostMessage,
    UpdateTopic,
    Pin,
}

impl RunStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::PostMessage => "post_message",
            Self::UpdateTopic => "update_topic",
            Self::Pin => "pin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: RunStep,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Done,
    Failed,
}

/// What one orchestration run did for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub channel_id: ChannelId,
    pub status: RunStatus,
    pub posted: bool,
    pub topic_updated: bool,
    pub pinned: bool,
    pub message_id: Option<MessageId>,
    /// Appended in step order; best-effort failures land here without
    /// changing `status`.
    pub errors: Vec<StepFailure>,
}

impl RunOutcome {
    pub fn started(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            status: RunStatus::Done,
            posted: false,
            topic_updated: false,
            pinned: false,
            message_id: None,
            errors: vec![],
        }
    }

    pub fn record(&mut self, step: RunStep, error: impl std::fmt::Display) {
        self.errors.push(StepFailure {
            step,
            message: error.to_string(),
        });
    }

    pub fn fail(mut self, step: RunStep, error: impl std::fmt::Display) -> Self {
        self.record(step, error);
        self.status = RunStatus::Failed;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }
}
