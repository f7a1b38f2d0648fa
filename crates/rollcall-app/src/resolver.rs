use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use rollcall_core::assignment::{OnCallAssignment, Roster};
use rollcall_core::ids::ChatUserId;
use rollcall_core::schedule::ScheduleRef;
use rollcall_core::user::OnCallUser;
use rollcall_ports::error::PortError;
use rollcall_ports::outbound::{ChatPlatform, Directory, ScheduleProvider};
use rollcall_ports::types::CurrentOnCall;

use crate::error::{AppError, ScheduleLookupFailure};

/// Rosters in the order the schedules were requested, plus the schedules
/// that could not be looked up.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub rosters: Vec<Roster>,
    pub failures: Vec<ScheduleLookupFailure>,
}

pub struct OnCallResolver<'a, S, D, C>
where
    S: ScheduleProvider,
    D: Directory,
    C: ChatPlatform,
{
    schedules: &'a S,
    directory: &'a D,
    chat: &'a C,
}

impl<'a, S, D, C> OnCallResolver<'a, S, D, C>
where
    S: ScheduleProvider,
    D: Directory,
    C: ChatPlatform,
{
    pub fn new(schedules: &'a S, directory: &'a D, chat: &'a C) -> Self {
        Self {
            schedules,
            directory,
            chat,
        }
    }

    /// Fails only when every requested schedule failed.
    pub async fn resolve(
        &self,
        references: &[ScheduleRef],
        as_of: DateTime<Utc>,
    ) -> Result<Resolution, AppError> {
        // lookups run concurrently; join_all hands results back in input order
        let results = join_all(references.iter().map(|r| self.resolve_one(r, as_of))).await;

        let mut resolution = Resolution::default();
        for (reference, result) in references.iter().zip(results) {
            match result {
                Ok(roster) => resolution.rosters.push(roster),
                Err(error) => {
                    warn!(schedule = %reference.id, error = %error, "Schedule lookup failed, skipping");
                    resolution.failures.push(ScheduleLookupFailure {
                        schedule_id: reference.id.clone(),
                        error,
                    });
                }
            }
        }

        if !references.is_empty() && resolution.rosters.is_empty() {
            return Err(AppError::ResolutionExhausted {
                failures: resolution.failures,
            });
        }
        Ok(resolution)
    }

    async fn resolve_one(
        &self,
        reference: &ScheduleRef,
        as_of: DateTime<Utc>,
    ) -> Result<Roster, PortError> {
        let schedule = self.schedules.get_schedule(&reference.id).await?;
        let roster = Roster::new(schedule, reference);

        let Some(current) = self
            .schedules
            .get_current_on_call(&reference.id, as_of)
            .await?
        else {
            debug!(schedule = %reference.id, "No one on call");
            return Ok(roster);
        };

        let user = self.resolve_user(&current).await;
        let assignment = OnCallAssignment::new(roster.schedule(), user, current.shift);
        Ok(roster.with_assignment(assignment))
    }

    async fn resolve_user(&self, current: &CurrentOnCall) -> OnCallUser {
        let entry = match &current.user {
            Some(embedded) => Some(embedded.clone()),
            None => match self.directory.get_user(&current.user_id).await {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(user = %current.user_id, error = %e, "Directory lookup failed");
                    None
                }
            },
        };

        let user = match entry {
            Some(entry) => OnCallUser::from_directory(entry.name.as_deref(), entry.email.as_deref()),
            None => OnCallUser::unknown(),
        };
        let mention = self.mention_for(user.email()).await;
        user.with_chat_user_id(mention)
    }

    async fn mention_for(&self, email: Option<&str>) -> Option<ChatUserId> {
        let email = email?;
        match self.chat.lookup_user_by_email(email).await {
            Ok(found) => found,
            Err(e) => {
                debug!(error = %e, "Chat user lookup failed, mention unavailable");
                None
            }
        }
    }
}
