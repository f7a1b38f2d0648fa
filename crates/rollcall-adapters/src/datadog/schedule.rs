use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use rollcall_core::ids::{ScheduleId, UserId};
use rollcall_core::schedule::{Schedule, Shift};
use rollcall_ports::error::PortError;
use rollcall_ports::outbound::ScheduleProvider;
use rollcall_ports::types::{CurrentOnCall, WindowedOnCall};

use super::wire::{find_included, Document, OnCallData, ScheduleData};
use super::DatadogClient;

const UNNAMED_SCHEDULE: &str = "Unnamed Schedule";

fn to_schedule(data: ScheduleData) -> Result<Schedule, PortError> {
    let id = ScheduleId::parse(&data.id).map_err(|e| PortError::Decode(e.to_string()))?;
    let name = data
        .attributes
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNNAMED_SCHEDULE.to_string());
    Ok(Schedule::from_provider(
        id,
        name,
        data.attributes.time_zone.as_deref(),
    ))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl ScheduleProvider for DatadogClient {
    async fn get_schedule(&self, id: &ScheduleId) -> Result<Schedule, PortError> {
        let doc: Document<ScheduleData> = self
            .get_json(&format!("/api/v2/on-call/schedules/{}", id), &[])
            .await?;
        let mut data = doc.data.ok_or(PortError::NotFound)?;
        if data.id.is_empty() {
            data.id = id.to_string();
        }
        to_schedule(data)
    }

    async fn get_current_on_call(
        &self,
        schedule_id: &ScheduleId,
        at: DateTime<Utc>,
    ) -> Result<Option<CurrentOnCall>, PortError> {
        let doc: Document<OnCallData> = self
            .get_json(
                &format!("/api/v2/on-call/schedules/{}/on-call", schedule_id),
                &[
                    ("include", "user".to_string()),
                    ("filter[at_ts]", timestamp(at)),
                ],
            )
            .await?;

        let Some(data) = doc.data else {
            debug!(schedule_id = %schedule_id, "no on-call data");
            return Ok(None);
        };
        let Some(user_ref) = data.relationships.user.data else {
            debug!(schedule_id = %schedule_id, "on-call entry has no user");
            return Ok(None);
        };

        let user_id = UserId::parse(&user_ref.id).map_err(|e| PortError::Decode(e.to_string()))?;
        let user = find_included(&doc.included, "users", &user_ref.id).map(|r| r.as_user());
        let shift = Shift::from_bounds(data.attributes.start, data.attributes.end);

        Ok(Some(CurrentOnCall {
            user_id,
            user,
            shift,
        }))
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, PortError> {
        let doc: Document<Vec<ScheduleData>> =
            self.get_json("/api/v2/on-call/schedules", &[]).await?;
        doc.data
            .unwrap_or_default()
            .into_iter()
            .filter(|d| !d.id.is_empty())
            .map(to_schedule)
            .collect()
    }

    async fn list_current_on_call(
        &self,
        schedule_ids: &[ScheduleId],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<WindowedOnCall>, PortError> {
        let doc: Document<Vec<OnCallData>> = self
            .get_json(
                "/api/v2/oncalls",
                &[
                    ("from", timestamp(window_start)),
                    ("to", timestamp(window_end)),
                ],
            )
            .await?;

        let mut entries = Vec::new();
        for data in doc.data.unwrap_or_default() {
            let Some(schedule_ref) = data.relationships.schedule.data else {
                continue;
            };
            let Ok(schedule_id) = ScheduleId::parse(&schedule_ref.id) else {
                continue;
            };
            if !schedule_ids.is_empty() && !schedule_ids.contains(&schedule_id) {
                continue;
            }

            let schedule_name = find_included(&doc.included, "schedules", &schedule_ref.id)
                .and_then(|r| r.name())
                .map(str::to_string);
            let user_ref = data.relationships.user.data;
            let user = user_ref
                .as_ref()
                .and_then(|u| find_included(&doc.included, "users", &u.id))
                .map(|r| r.as_user());
            let user_id = user_ref.and_then(|u| UserId::parse(&u.id).ok());

            entries.push(WindowedOnCall {
                schedule_id,
                schedule_name,
                user_id,
                user,
                shift: Shift::from_bounds(data.attributes.start, data.attributes.end),
            });
        }
        Ok(entries)
    }
}
