use serde::{Deserialize, Serialize};

use crate::ids::ScheduleId;

/// A channel's view of a schedule: which one, and how to present it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRef {
    pub id: ScheduleId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub priority: bool,
}

impl ScheduleRef {
    pub fn new(id: ScheduleId) -> Self {
        Self {
            id,
            name: None,
            emoji: None,
            priority: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn prioritized(mut self) -> Self {
        self.priority = true;
        self
    }
}
