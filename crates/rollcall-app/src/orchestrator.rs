use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use rollcall_core::channel::{ChannelConfig, PostingMode};
use rollcall_core::message::{compose, ChatPayload, ComposeContext};
use rollcall_ports::inbound::ChannelRunner;
use rollcall_ports::outbound::{ChatPlatform, Directory, ScheduleProvider};
use rollcall_ports::types::{RunOutcome, RunStep};

use crate::error::AppError;
use crate::resolver::OnCallResolver;

#[derive(Debug, Clone, Default)]
pub struct OrchestratorSettings {
    /// Zone for footers and roll-up dates; each channel's own zone otherwise.
    pub time_zone: Option<Tz>,
    pub footer_note: Option<String>,
}

/// Whether a failed step fails the whole run for this mode. Everything else
/// is best-effort: recorded on the outcome, then the run continues.
pub fn is_required(step: RunStep, mode: PostingMode) -> bool {
    match step {
        RunStep::Resolve => true,
        RunStep::PostMessage => mode.posts_message(),
        RunStep::UpdateTopic => mode == PostingMode::TopicOnly,
        RunStep::Pin => false,
    }
}

pub struct PostingOrchestrator<S, D, C>
where
    S: ScheduleProvider,
    D: Directory,
    C: ChatPlatform,
{
    schedules: S,
    directory: D,
    chat: C,
    settings: OrchestratorSettings,
}

impl<S, D, C> PostingOrchestrator<S, D, C>
where
    S: ScheduleProvider,
    D: Directory,
    C: ChatPlatform,
{
    pub fn new(schedules: S, directory: D, chat: C, settings: OrchestratorSettings) -> Self {
        Self {
            schedules,
            directory,
            chat,
            settings,
        }
    }

    pub fn resolver(&self) -> OnCallResolver<'_, S, D, C> {
        OnCallResolver::new(&self.schedules, &self.directory, &self.chat)
    }

    pub fn schedules(&self) -> &S {
        &self.schedules
    }

    pub fn compose_context(&self, channel: &ChannelConfig, as_of: DateTime<Utc>) -> ComposeContext {
        ComposeContext {
            as_of,
            zone: self.settings.time_zone.or(Some(*channel.time_zone())),
            highlight: channel.highlight().cloned(),
            topic_when_empty: channel.topic_when_empty(),
            footer_note: self.settings.footer_note.clone(),
        }
    }

    /// Resolves and composes without touching the chat channel.
    pub async fn preview(
        &self,
        channel: &ChannelConfig,
        as_of: DateTime<Utc>,
    ) -> Result<ChatPayload, AppError> {
        let resolution = self.resolver().resolve(channel.schedules(), as_of).await?;
        Ok(compose(
            &resolution.rosters,
            channel.mode(),
            &self.compose_context(channel, as_of),
        ))
    }
}

#[async_trait]
impl<S, D, C> ChannelRunner for PostingOrchestrator<S, D, C>
where
    S: ScheduleProvider,
    D: Directory,
    C: ChatPlatform,
{
    async fn run(&self, channel: &ChannelConfig, as_of: DateTime<Utc>) -> RunOutcome {
        let label = channel.label();
        let mode = channel.mode();
        let target = channel.channel_id();
        let mut outcome = RunOutcome::started(target.clone());

        let resolution = match self.resolver().resolve(channel.schedules(), as_of).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(channel = label, error = %e, "On-call resolution failed");
                return outcome.fail(RunStep::Resolve, e);
            }
        };
        for failure in &resolution.failures {
            outcome.record(RunStep::Resolve, failure);
        }

        let payload = compose(
            &resolution.rosters,
            mode,
            &self.compose_context(channel, as_of),
        );

        if mode.posts_message() {
            match self
                .chat
                .post_message(target, payload.summary_text(), payload.blocks())
                .await
            {
                Ok(posted) => {
                    info!(channel = label, message = %posted.message_id, "Posted on-call message");
                    outcome.posted = true;
                    outcome.message_id = Some(posted.message_id);
                }
                Err(e) if is_required(RunStep::PostMessage, mode) => {
                    error!(channel = label, error = %e, "Failed to post on-call message");
                    return outcome.fail(RunStep::PostMessage, e);
                }
                Err(e) => outcome.record(RunStep::PostMessage, e),
            }
        }

        if mode.updates_topic() {
            match payload.topic_text() {
                Some(topic) => match self.chat.set_topic(target, topic).await {
                    Ok(()) => {
                        info!(channel = label, "Updated channel topic");
                        outcome.topic_updated = true;
                    }
                    Err(e) if is_required(RunStep::UpdateTopic, mode) => {
                        error!(channel = label, error = %e, "Failed to update channel topic");
                        return outcome.fail(RunStep::UpdateTopic, e);
                    }
                    Err(e) => {
                        warn!(channel = label, error = %e, "Could not update channel topic");
                        outcome.record(RunStep::UpdateTopic, e);
                    }
                },
                None => debug!(channel = label, "Nobody on call, leaving topic unchanged"),
            }
        }

        if mode.pins() && channel.pin_on_post() {
            if let Some(message_id) = outcome.message_id.clone() {
                match self.chat.pin_message(target, &message_id).await {
                    Ok(()) => {
                        info!(channel = label, "Pinned on-call message");
                        outcome.pinned = true;
                    }
                    Err(e) => {
                        warn!(channel = label, error = %e, "Could not pin message");
                        outcome.record(RunStep::Pin, e);
                    }
                }
            }
        }

        outcome
    }
}
