use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ChannelId, ScheduleId};
use crate::schedule::ScheduleRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostingMode {
    Full,
    MessageOnly,
    TopicOnly,
    RollUpAll,
}

impl PostingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::MessageOnly => "message-only",
            Self::TopicOnly => "topic-only",
            Self::RollUpAll => "roll-up-all",
        }
    }

    pub fn posts_message(&self) -> bool {
        !matches!(self, Self::TopicOnly)
    }

    pub fn updates_topic(&self) -> bool {
        matches!(self, Self::Full | Self::TopicOnly)
    }

    pub fn pins(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl FromStr for PostingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "message-only" => Ok(Self::MessageOnly),
            "topic-only" => Ok(Self::TopicOnly),
            // the older multi-channel setups called roll-up "general-all-teams"
            "roll-up-all" | "general-all-teams" => Ok(Self::RollUpAll),
            other => Err(DomainError::UnknownPostingMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for PostingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to write into the topic when nobody is on call anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicFallback {
    #[default]
    Placeholder,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    channel_id: ChannelId,
    label: Option<String>,
    schedules: Vec<ScheduleRef>,
    cron: String,
    time_zone: Tz,
    mode: PostingMode,
    pin_on_post: bool,
    highlight: Option<ScheduleId>,
    topic_when_empty: TopicFallback,
}

impl ChannelConfig {
    pub fn new(
        channel_id: ChannelId,
        schedules: Vec<ScheduleRef>,
        cron: String,
        time_zone: Tz,
        mode: PostingMode,
    ) -> Result<Self, DomainError> {
        if schedules.is_empty() {
            return Err(DomainError::ChannelRequiresSchedule);
        }
        Ok(Self {
            channel_id,
            label: None,
            schedules,
            cron,
            time_zone,
            mode,
            pin_on_post: false,
            highlight: None,
            topic_when_empty: TopicFallback::default(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_pin(mut self, pin: bool) -> Self {
        self.pin_on_post = pin;
        self
    }

    pub fn with_highlight(mut self, schedule_id: Option<ScheduleId>) -> Self {
        self.highlight = schedule_id;
        self
    }

    pub fn with_topic_fallback(mut self, fallback: TopicFallback) -> Self {
        self.topic_when_empty = fallback;
        self
    }

    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Human label for logs; the channel id when none was configured.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.channel_id.as_str())
    }

    pub fn schedules(&self) -> &[ScheduleRef] {
        &self.schedules
    }

    pub fn cron(&self) -> &str {
        &self.cron
    }

    pub fn time_zone(&self) -> &Tz {
        &self.time_zone
    }

    pub fn mode(&self) -> PostingMode {
        self.mode
    }

    pub fn pin_on_post(&self) -> bool {
        self.pin_on_post
    }

    pub fn highlight(&self) -> Option<&ScheduleId> {
        self.highlight.as_ref()
    }

    pub fn topic_when_empty(&self) -> TopicFallback {
        self.topic_when_empty
    }
}
