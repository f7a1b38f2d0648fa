pub mod reference;
pub mod shift;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ScheduleId;

pub use reference::ScheduleRef;
pub use shift::Shift;

mod tz_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Option<Tz>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match tz {
            Some(tz) => serializer.serialize_some(tz.name()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Tz>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| s.parse::<Tz>().map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, DomainError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimeZone(name.to_string()))
}

/// A rotation as the provider describes it. Read-only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    name: String,
    #[serde(with = "tz_serde", default)]
    time_zone: Option<Tz>,
}

impl Schedule {
    pub fn new(id: ScheduleId, name: String, time_zone: Option<Tz>) -> Self {
        Self {
            id,
            name,
            time_zone,
        }
    }

    /// Builds a schedule from the provider's raw zone string. Unknown zones are
    /// dropped rather than rejected; rendering then uses the caller's zone.
    pub fn from_provider(id: ScheduleId, name: String, time_zone: Option<&str>) -> Self {
        let time_zone = time_zone.and_then(|tz| parse_time_zone(tz).ok());
        Self::new(id, name, time_zone)
    }

    /// Same schedule under a locally configured display name.
    pub fn renamed(mut self, name: Option<&str>) -> Self {
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.name = name.to_string();
        }
        self
    }

    pub fn id(&self) -> &ScheduleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_zone(&self) -> Option<&Tz> {
        self.time_zone.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ScheduleId {
        ScheduleId::parse(s).unwrap()
    }

    #[test]
    fn from_provider_parses_zone() {
        let sched = Schedule::from_provider(id("s1"), "Platform".into(), Some("America/Toronto"));
        assert_eq!(sched.time_zone(), Some(&chrono_tz::America::Toronto));
    }

    #[test]
    fn from_provider_drops_unknown_zone() {
        let sched = Schedule::from_provider(id("s1"), "Platform".into(), Some("Mars/Olympus"));
        assert_eq!(sched.time_zone(), None);
    }

    #[test]
    fn renamed_overrides_display_name() {
        let sched = Schedule::new(id("s1"), "TSA 24x7 (prod)".into(), None).renamed(Some("TSA"));
        assert_eq!(sched.name(), "TSA");
    }

    #[test]
    fn renamed_ignores_blank_override() {
        let sched = Schedule::new(id("s1"), "Deployment".into(), None).renamed(Some("  "));
        assert_eq!(sched.name(), "Deployment");
    }

    #[test]
    fn parse_time_zone_rejects_garbage() {
        assert_eq!(
            parse_time_zone("Nowhere/Special"),
            Err(DomainError::InvalidTimeZone("Nowhere/Special".into()))
        );
    }

    #[test]
    fn time_zone_round_trips_through_serde() {
        let sched = Schedule::new(id("s1"), "Ops".into(), Some(chrono_tz::Europe::Zurich));
        let json = serde_json::to_string(&sched).unwrap();
        assert!(json.contains("Europe/Zurich"));
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sched);
    }
}
