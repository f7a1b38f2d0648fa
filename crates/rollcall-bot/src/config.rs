//! Runtime configuration: secrets from the environment, channels from a TOML
//! file, with a single-channel environment fallback when the file is absent.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use rollcall_adapters::datadog::DatadogConfig;
use rollcall_app::orchestrator::OrchestratorSettings;
use rollcall_core::channel::{ChannelConfig, PostingMode, TopicFallback};
use rollcall_core::error::DomainError;
use rollcall_core::ids::{ChannelId, ScheduleId};
use rollcall_core::schedule::{parse_time_zone, ScheduleRef};

use crate::scheduler::CronSchedule;

pub const DEFAULT_CONFIG_PATH: &str = "rollcall.toml";

const PLACEHOLDER_MARKER: &str = "your_";
const DEFAULT_SITE: &str = "datadoghq.eu";
const DEFAULT_CRON: &str = "0 9 * * *";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("channel {channel}: invalid cron expression `{expression}`: {reason}")]
    Cron {
        channel: String,
        expression: String,
        reason: String,
    },

    #[error("channel {channel}: {source}")]
    Channel {
        channel: String,
        #[source]
        source: DomainError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("no channels configured")]
    NoChannels,

    #[error("channel {0} is configured more than once")]
    DuplicateChannel(String),
}

/// A value that is empty or still carries the sample `your_...` text counts
/// as unset.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.contains(PLACEHOLDER_MARKER))
}

/// Reads every named variable, reporting all missing ones at once.
fn require<const N: usize>(
    lookup: &impl Fn(&str) -> Option<String>,
    keys: [&str; N],
) -> Result<[String; N], ConfigError> {
    let mut missing = Vec::new();
    let values = keys.map(|key| {
        present(lookup(key)).unwrap_or_else(|| {
            missing.push(key.to_string());
            String::new()
        })
    });
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(ConfigError::Missing(missing))
    }
}

pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub fn datadog_config(
    lookup: &impl Fn(&str) -> Option<String>,
    timeout: Duration,
) -> Result<DatadogConfig, ConfigError> {
    let [api_key, app_key] = require(lookup, ["DATADOG_API_KEY", "DATADOG_APP_KEY"])?;
    Ok(DatadogConfig {
        api_key,
        app_key,
        site: present(lookup("DATADOG_SITE")).unwrap_or_else(|| DEFAULT_SITE.to_string()),
        timeout,
    })
}

pub fn slack_token(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let [token] = require(lookup, ["SLACK_BOT_TOKEN"])?;
    Ok(token)
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    bot: BotSection,
    #[serde(default)]
    channels: Vec<ChannelSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BotSection {
    time_zone: Option<String>,
    request_timeout_secs: Option<u64>,
    footer_note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChannelSection {
    id: String,
    name: Option<String>,
    cron: String,
    time_zone: Option<String>,
    mode: Option<String>,
    #[serde(default)]
    pin: bool,
    highlight: Option<String>,
    #[serde(default)]
    topic_when_empty: TopicFallback,
    #[serde(default)]
    schedules: Vec<ScheduleRef>,
}

/// Everything the bot needs besides secrets.
#[derive(Debug, Clone)]
pub struct Settings {
    pub time_zone: Option<Tz>,
    pub request_timeout: Duration,
    pub footer_note: Option<String>,
    pub channels: Vec<ChannelConfig>,
}

impl Settings {
    /// Reads `path` when it exists, otherwise builds one channel from the
    /// legacy environment variables.
    pub fn load(
        path: &Path,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&text)
        } else {
            Self::from_legacy_env(lookup)
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        if file.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        let time_zone = file
            .bot
            .time_zone
            .as_deref()
            .map(parse_time_zone)
            .transpose()?;
        let channels = file
            .channels
            .into_iter()
            .map(build_channel)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique(&channels)?;

        Ok(Self {
            time_zone,
            request_timeout: Duration::from_secs(
                file.bot.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            footer_note: file.bot.footer_note.filter(|n| !n.trim().is_empty()),
            channels,
        })
    }

    pub fn from_legacy_env(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let [channel_id, schedule_id] = require(lookup, ["SLACK_CHANNEL_ID", "DATADOG_SCHEDULE_ID"])?;
        let section = ChannelSection {
            id: channel_id,
            name: None,
            cron: present(lookup("CRON_SCHEDULE")).unwrap_or_else(|| DEFAULT_CRON.to_string()),
            time_zone: present(lookup("TIMEZONE")),
            mode: present(lookup("POST_MODE")),
            pin: present(lookup("PIN_MESSAGE")).is_some_and(|v| v == "true"),
            highlight: None,
            topic_when_empty: TopicFallback::default(),
            schedules: vec![ScheduleRef::new(ScheduleId::parse(&schedule_id)?)],
        };

        Ok(Self {
            time_zone: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            footer_note: None,
            channels: vec![build_channel(section)?],
        })
    }

    pub fn channel(&self, id: &str) -> Option<&ChannelConfig> {
        self.channels
            .iter()
            .find(|c| c.channel_id().as_str() == id.trim())
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            time_zone: self.time_zone,
            footer_note: self.footer_note.clone(),
        }
    }
}

/// Each channel id may appear once; all of its runs share one sequential task.
fn ensure_unique(channels: &[ChannelConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for channel in channels {
        if !seen.insert(channel.channel_id()) {
            return Err(ConfigError::DuplicateChannel(
                channel.channel_id().to_string(),
            ));
        }
    }
    Ok(())
}

fn build_channel(section: ChannelSection) -> Result<ChannelConfig, ConfigError> {
    let label = section.name.clone().unwrap_or_else(|| section.id.clone());
    let in_channel = |source: DomainError| ConfigError::Channel {
        channel: label.clone(),
        source,
    };

    let channel_id = ChannelId::parse(&section.id).map_err(in_channel)?;
    let time_zone = match section.time_zone.as_deref() {
        Some(tz) => parse_time_zone(tz).map_err(in_channel)?,
        None => Tz::UTC,
    };
    let mode = match section.mode.as_deref() {
        Some(mode) => PostingMode::from_str(mode).map_err(in_channel)?,
        None => PostingMode::Full,
    };
    let highlight = section
        .highlight
        .as_deref()
        .map(ScheduleId::parse)
        .transpose()
        .map_err(in_channel)?;

    CronSchedule::parse(&section.cron).map_err(|reason| ConfigError::Cron {
        channel: label.clone(),
        expression: section.cron.clone(),
        reason,
    })?;

    if section.pin && !mode.pins() {
        warn!(channel = %label, mode = %mode, "pin is only applied in full mode; ignoring");
    }

    let mut channel = ChannelConfig::new(channel_id, section.schedules, section.cron, time_zone, mode)
        .map_err(in_channel)?
        .with_pin(section.pin)
        .with_highlight(highlight)
        .with_topic_fallback(section.topic_when_empty);
    if let Some(name) = section.name {
        channel = channel.with_label(name);
    }
    Ok(channel)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SAMPLE: &str = r#"
        [bot]
        time_zone = "America/Toronto"
        footer_note = "Questions? #ops"

        [[channels]]
        id = "C111"
        name = "oncall-bot"
        cron = "0 9 * * 1-5"
        time_zone = "America/Toronto"
        mode = "full"
        pin = true

        [[channels.schedules]]
        id = "sched-primary"
        name = "Primary"

        [[channels]]
        id = "C222"
        cron = "30 8 * * *"
        mode = "roll-up-all"
        highlight = "sched-ic"
        topic_when_empty = "skip"

        [[channels.schedules]]
        id = "sched-ic"
        emoji = "🚒"
        priority = true

        [[channels.schedules]]
        id = "sched-db"
        emoji = "🗄️"
    "#;

    #[test]
    fn parses_channels_from_toml() {
        let settings = Settings::from_toml(SAMPLE).unwrap();
        assert_eq!(settings.time_zone, Some(Tz::America__Toronto));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.footer_note.as_deref(), Some("Questions? #ops"));
        assert_eq!(settings.channels.len(), 2);

        let first = &settings.channels[0];
        assert_eq!(first.label(), "oncall-bot");
        assert_eq!(first.mode(), PostingMode::Full);
        assert!(first.pin_on_post());
        assert_eq!(first.schedules()[0].name.as_deref(), Some("Primary"));

        let second = settings.channel("C222").unwrap();
        assert_eq!(second.mode(), PostingMode::RollUpAll);
        assert_eq!(*second.time_zone(), Tz::UTC);
        assert_eq!(second.highlight().map(|h| h.as_str()), Some("sched-ic"));
        assert_eq!(second.topic_when_empty(), TopicFallback::Skip);
        assert!(second.schedules()[0].priority);
        assert_eq!(second.label(), "C222");
    }

    #[test]
    fn rejects_bad_cron() {
        let text = r#"
            [[channels]]
            id = "C1"
            cron = "every morning"
            [[channels.schedules]]
            id = "s"
        "#;
        let err = Settings::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::Cron { ref channel, .. } if channel == "C1"));
    }

    #[test]
    fn rejects_unknown_zone() {
        let text = r#"
            [[channels]]
            id = "C1"
            cron = "0 9 * * *"
            time_zone = "Mars/Olympus"
            [[channels.schedules]]
            id = "s"
        "#;
        let err = Settings::from_toml(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Channel {
                source: DomainError::InvalidTimeZone(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_channel_without_schedules() {
        let text = r#"
            [[channels]]
            id = "C1"
            cron = "0 9 * * *"
        "#;
        let err = Settings::from_toml(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Channel {
                source: DomainError::ChannelRequiresSchedule,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_mode() {
        let text = r#"
            [[channels]]
            id = "C1"
            cron = "0 9 * * *"
            mode = "shout"
            [[channels.schedules]]
            id = "s"
        "#;
        assert!(matches!(
            Settings::from_toml(text).unwrap_err(),
            ConfigError::Channel {
                source: DomainError::UnknownPostingMode(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_same_channel_twice() {
        let text = r#"
            [[channels]]
            id = "C1"
            cron = "0 9 * * *"
            mode = "full"
            [[channels.schedules]]
            id = "s1"

            [[channels]]
            id = " C1 "
            cron = "0 9 * * *"
            mode = "topic-only"
            [[channels.schedules]]
            id = "s2"
        "#;
        match Settings::from_toml(text).unwrap_err() {
            ConfigError::DuplicateChannel(id) => assert_eq!(id, "C1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_has_no_channels() {
        assert!(matches!(
            Settings::from_toml("").unwrap_err(),
            ConfigError::NoChannels
        ));
    }

    #[test]
    fn legacy_env_builds_single_channel() {
        let lookup = lookup_from(&[
            ("SLACK_CHANNEL_ID", "C999"),
            ("DATADOG_SCHEDULE_ID", "sched-1"),
            ("TIMEZONE", "Europe/Paris"),
            ("PIN_MESSAGE", "true"),
        ]);
        let settings = Settings::from_legacy_env(&lookup).unwrap();
        let channel = &settings.channels[0];
        assert_eq!(channel.channel_id().as_str(), "C999");
        assert_eq!(channel.cron(), DEFAULT_CRON);
        assert_eq!(*channel.time_zone(), Tz::Europe__Paris);
        assert_eq!(channel.mode(), PostingMode::Full);
        assert!(channel.pin_on_post());
        assert_eq!(channel.schedules()[0].id.as_str(), "sched-1");
    }

    #[test]
    fn legacy_env_reports_every_missing_key() {
        let lookup = lookup_from(&[("SLACK_CHANNEL_ID", "your_channel_id")]);
        let err = Settings::from_legacy_env(&lookup).unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(keys, vec!["SLACK_CHANNEL_ID", "DATADOG_SCHEDULE_ID"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn placeholder_secrets_count_as_missing() {
        let lookup = lookup_from(&[
            ("DATADOG_API_KEY", "your_api_key_here"),
            ("DATADOG_APP_KEY", "real-app-key"),
        ]);
        let err = datadog_config(&lookup, Duration::from_secs(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required configuration: DATADOG_API_KEY"
        );
        assert!(slack_token(&lookup).is_err());
    }

    #[test]
    fn datadog_site_defaults_to_eu() {
        let lookup = lookup_from(&[("DATADOG_API_KEY", "a"), ("DATADOG_APP_KEY", "b")]);
        let config = datadog_config(&lookup, Duration::from_secs(1)).unwrap();
        assert_eq!(config.site, "datadoghq.eu");
    }

    #[test]
    fn missing_file_falls_back_to_env() {
        let lookup = lookup_from(&[
            ("SLACK_CHANNEL_ID", "C1"),
            ("DATADOG_SCHEDULE_ID", "s1"),
            ("POST_MODE", "topic-only"),
        ]);
        let settings =
            Settings::load(Path::new("/nonexistent/rollcall.toml"), &lookup).unwrap();
        assert_eq!(settings.channels[0].mode(), PostingMode::TopicOnly);
    }
}
