use std::fmt;

use serde::Serialize;

use crate::ids::ChatUserId;

use super::NO_ONE_SCHEDULED;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPayload {
    summary_text: String,
    blocks: Vec<Block>,
    topic_text: Option<String>,
}

impl ChatPayload {
    pub fn new(summary_text: String, blocks: Vec<Block>, topic_text: Option<String>) -> Self {
        Self {
            summary_text,
            blocks,
            topic_text,
        }
    }

    pub fn topic_only(topic_text: Option<String>) -> Self {
        Self::new(String::new(), vec![], topic_text)
    }

    pub fn summary_text(&self) -> &str {
        &self.summary_text
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn topic_text(&self) -> Option<&str> {
        self.topic_text.as_deref()
    }

    /// Markup-free rendering of every block, one block per paragraph.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Block {
    Header(String),
    Context(String),
    Schedule(ScheduleSection),
    Notice(String),
    Divider,
    Footer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStyle {
    /// One schedule per section with email and shift range.
    Detailed,
    /// Standalone roll-up entry shown above the rest.
    Highlighted,
    /// Roll-up entry: label plus mentions on one line.
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSection {
    pub title: String,
    pub emoji: Option<String>,
    pub style: SectionStyle,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    Assignee(Assignee),
    Vacant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignee {
    pub name: String,
    pub chat_user_id: Option<ChatUserId>,
    pub email: Option<String>,
    pub shift: Option<ShiftLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLabel {
    Range(String),
    Until(String),
}

impl ScheduleSection {
    fn label(&self) -> &str {
        self.emoji.as_deref().unwrap_or("📋")
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(text) | Self::Context(text) | Self::Notice(text) | Self::Footer(text) => {
                f.write_str(text)
            }
            Self::Divider => f.write_str("---"),
            Self::Schedule(section) => write!(f, "{section}"),
        }
    }
}

impl fmt::Display for ScheduleSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            SectionStyle::Detailed => {
                write!(f, "{} {}", self.label(), self.title)?;
                for line in &self.lines {
                    match line {
                        Line::Assignee(a) => {
                            write!(f, "\n👤 Engineer: {}", a.name)?;
                            if let Some(email) = &a.email {
                                write!(f, " ({email})")?;
                            }
                            if let Some(shift) = &a.shift {
                                write!(f, "\n⏰ Shift: {shift}")?;
                            }
                        }
                        Line::Vacant => write!(f, "\n👤 {NO_ONE_SCHEDULED}")?,
                    }
                }
                Ok(())
            }
            SectionStyle::Highlighted => {
                write!(f, "{} {} ⭐", self.label(), self.title)?;
                for line in &self.lines {
                    write!(f, "\n🔹 {line}")?;
                }
                Ok(())
            }
            SectionStyle::Compact => {
                let entries = self
                    .lines
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} {}\n      {}", self.label(), self.title, entries)
            }
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignee(a) => {
                f.write_str(&a.name)?;
                if let Some(shift) = &a.shift {
                    write!(f, " {shift}")?;
                }
                Ok(())
            }
            Self::Vacant => f.write_str(NO_ONE_SCHEDULED),
        }
    }
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(range) => f.write_str(range),
            Self::Until(end) => write!(f, "until {end}"),
        }
    }
}
