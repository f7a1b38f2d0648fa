use serde::{Deserialize, Serialize};

use crate::ids::ChatUserId;

pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCallUser {
    name: String,
    email: Option<String>,
    chat_user_id: Option<ChatUserId>,
}

impl OnCallUser {
    /// Display name falls back to the email, then to [`UNKNOWN_USER`].
    pub fn from_directory(name: Option<&str>, email: Option<&str>) -> Self {
        let name = non_blank(name);
        let email = non_blank(email);
        let display = name
            .or(email)
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        Self {
            name: display,
            email: email.map(str::to_string),
            chat_user_id: None,
        }
    }

    pub fn unknown() -> Self {
        Self::from_directory(None, None)
    }

    pub fn with_chat_user_id(mut self, id: Option<ChatUserId>) -> Self {
        self.chat_user_id = id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn chat_user_id(&self) -> Option<&ChatUserId> {
        self.chat_user_id.as_ref()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
