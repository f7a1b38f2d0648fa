use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rollcall_core::ids::{ChannelId, ChatUserId, MessageId, ScheduleId, UserId};
use rollcall_core::message::Block;
use rollcall_core::schedule::{Schedule, Shift};
use rollcall_ports::error::PortError;
use rollcall_ports::outbound::{ChatPlatform, Directory, ScheduleProvider};
use rollcall_ports::types::{CurrentOnCall, DirectoryUser, PostedMessage, WindowedOnCall};

pub(crate) fn ts(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .unwrap()
        .with_timezone(&Utc)
}

pub(crate) fn shift() -> Option<Shift> {
    Shift::new(ts("2025-01-15T14:00:00Z"), ts("2025-01-15T22:00:00Z")).ok()
}

#[derive(Default)]
pub(crate) struct MockProvider {
    schedules: HashMap<String, Schedule>,
    on_call: HashMap<String, CurrentOnCall>,
    failing: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn with_schedule(mut self, id: &str, name: &str) -> Self {
        let schedule = Schedule::new(
            ScheduleId::parse(id).unwrap(),
            name.into(),
            Some(chrono_tz::America::Toronto),
        );
        self.schedules.insert(id.into(), schedule);
        self
    }

    pub fn with_on_call(
        mut self,
        id: &str,
        user_id: &str,
        user: Option<DirectoryUser>,
        shift: Option<Shift>,
    ) -> Self {
        self.on_call.insert(
            id.into(),
            CurrentOnCall {
                user_id: UserId::parse(user_id).unwrap(),
                user,
                shift,
            },
        );
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.into());
        self
    }
}

#[async_trait]
impl ScheduleProvider for MockProvider {
    async fn get_schedule(&self, id: &ScheduleId) -> Result<Schedule, PortError> {
        self.calls.lock().unwrap().push(format!("schedule:{id}"));
        self.schedules
            .get(id.as_str())
            .cloned()
            .ok_or(PortError::NotFound)
    }

    async fn get_current_on_call(
        &self,
        schedule_id: &ScheduleId,
        _at: DateTime<Utc>,
    ) -> Result<Option<CurrentOnCall>, PortError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("on-call:{schedule_id}"));
        if self.failing.contains(schedule_id.as_str()) {
            return Err(PortError::Connection("connection reset".into()));
        }
        Ok(self.on_call.get(schedule_id.as_str()).cloned())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, PortError> {
        let mut all: Vec<_> = self.schedules.values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(all)
    }

    async fn list_current_on_call(
        &self,
        _schedule_ids: &[ScheduleId],
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> Result<Vec<WindowedOnCall>, PortError> {
        Ok(vec![])
    }
}

#[derive(Default)]
pub(crate) struct MockDirectory {
    users: HashMap<String, DirectoryUser>,
    pub calls: Mutex<Vec<String>>,
}

impl MockDirectory {
    pub fn with_user(mut self, id: &str, user: DirectoryUser) -> Self {
        self.users.insert(id.into(), user);
        self
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn get_user(&self, user_id: &UserId) -> Result<DirectoryUser, PortError> {
        self.calls.lock().unwrap().push(user_id.to_string());
        self.users
            .get(user_id.as_str())
            .cloned()
            .ok_or(PortError::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct MockChat {
    pub members: HashMap<String, String>,
    pub fail_lookup: bool,
    pub fail_post: bool,
    pub fail_topic: bool,
    pub fail_pin: bool,
    pub calls: Mutex<Vec<String>>,
    pub posted: Mutex<Vec<(String, Vec<Block>)>>,
}

impl MockChat {
    pub fn with_member(mut self, email: &str, id: &str) -> Self {
        self.members.insert(email.into(), id.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatPlatform for MockChat {
    async fn post_message(
        &self,
        channel: &ChannelId,
        summary_text: &str,
        blocks: &[Block],
    ) -> Result<PostedMessage, PortError> {
        self.calls.lock().unwrap().push(format!("post:{channel}"));
        if self.fail_post {
            return Err(PortError::Api("channel_not_found".into()));
        }
        self.posted
            .lock()
            .unwrap()
            .push((summary_text.to_string(), blocks.to_vec()));
        Ok(PostedMessage {
            message_id: MessageId::parse("1736949600.000100").unwrap(),
        })
    }

    async fn set_topic(&self, channel: &ChannelId, topic: &str) -> Result<(), PortError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("topic:{channel}:{topic}"));
        if self.fail_topic {
            return Err(PortError::Api("missing_scope".into()));
        }
        Ok(())
    }

    async fn pin_message(&self, channel: &ChannelId, message: &MessageId) -> Result<(), PortError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("pin:{channel}:{message}"));
        if self.fail_pin {
            return Err(PortError::Api("not_pinnable".into()));
        }
        Ok(())
    }

    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<ChatUserId>, PortError> {
        if self.fail_lookup {
            return Err(PortError::Timeout);
        }
        Ok(self
            .members
            .get(email)
            .map(|id| ChatUserId::parse(id).unwrap()))
    }
}
