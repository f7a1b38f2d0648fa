//! JSON:API shapes returned by the Datadog On-Call endpoints. Every field is
//! optional upstream, so everything defaults.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use rollcall_ports::types::DirectoryUser;

#[derive(Debug, Deserialize)]
pub(super) struct Document<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub included: Vec<Resource>,
}

/// A generic included resource; attributes are read per type.
#[derive(Debug, Deserialize)]
pub(super) struct Resource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl Resource {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    pub fn as_user(&self) -> DirectoryUser {
        DirectoryUser {
            name: self.attribute("name").map(str::to_string),
            email: self.attribute("email").map(str::to_string),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.attribute("name")
    }
}

pub(super) fn find_included<'a>(
    included: &'a [Resource],
    kind: &str,
    id: &str,
) -> Option<&'a Resource> {
    included.iter().find(|r| r.kind == kind && r.id == id)
}

#[derive(Debug, Deserialize)]
pub(super) struct ScheduleData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: ScheduleAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ScheduleAttributes {
    pub name: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ShiftAttributes {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Relationship {
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResourceRef {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct OnCallRelationships {
    #[serde(default)]
    pub user: Relationship,
    #[serde(default)]
    pub schedule: Relationship,
}

#[derive(Debug, Deserialize)]
pub(super) struct OnCallData {
    #[serde(default)]
    pub attributes: ShiftAttributes,
    #[serde(default)]
    pub relationships: OnCallRelationships,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserData {
    #[serde(default)]
    pub attributes: UserAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserAttributes {
    pub name: Option<String>,
    pub email: Option<String>,
}
