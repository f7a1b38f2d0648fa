//! Cron-driven runs: one task per channel, each firing its runs one after
//! another so a channel never has two runs in flight.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use croner::Cron;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use rollcall_core::channel::ChannelConfig;
use rollcall_ports::inbound::ChannelRunner;

use crate::report;

/// A parsed five-field cron expression.
pub struct CronSchedule {
    cron: Cron,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, String> {
        Cron::new(expression.trim())
            .parse()
            .map(|cron| Self { cron })
            .map_err(|e| e.to_string())
    }

    /// First fire time strictly after `after`, evaluated on `zone`'s wall clock.
    pub fn next_after(&self, after: DateTime<Utc>, zone: Tz) -> Option<DateTime<Utc>> {
        self.cron
            .find_next_occurrence(&after.with_timezone(&zone), false)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Pairs each channel with its parsed expression. Expressions were validated
/// at config load, so a failure here is reported as a config problem.
pub fn plan(channels: Vec<ChannelConfig>) -> Result<Vec<(ChannelConfig, CronSchedule)>, String> {
    channels
        .into_iter()
        .map(|channel| {
            let schedule = CronSchedule::parse(channel.cron())
                .map_err(|e| format!("channel {}: {e}", channel.label()))?;
            Ok::<_, String>((channel, schedule))
        })
        .collect()
}

pub fn spawn_all(
    runner: Arc<dyn ChannelRunner>,
    plan: Vec<(ChannelConfig, CronSchedule)>,
) -> JoinSet<()> {
    let now = Utc::now();
    let mut tasks = JoinSet::new();
    for (channel, schedule) in plan {
        match schedule.next_after(now, *channel.time_zone()) {
            Some(next) => info!(
                channel = channel.label(),
                cron = channel.cron(),
                time_zone = channel.time_zone().name(),
                mode = %channel.mode(),
                next_run = %next.with_timezone(channel.time_zone()),
                "Channel scheduled"
            ),
            None => warn!(channel = channel.label(), cron = channel.cron(), "Cron expression never fires"),
        }
        tasks.spawn(run_channel(Arc::clone(&runner), channel, schedule));
    }
    tasks
}

async fn run_channel(runner: Arc<dyn ChannelRunner>, channel: ChannelConfig, schedule: CronSchedule) {
    let zone = *channel.time_zone();
    let mut last_fire: Option<DateTime<Utc>> = None;

    loop {
        let now = Utc::now();
        // The wall clock may lag the sleep timer slightly; never refire the same slot.
        let after = last_fire.map_or(now, |fired| fired.max(now));
        let Some(next) = schedule.next_after(after, zone) else {
            warn!(channel = channel.label(), "No further runs for this channel");
            return;
        };

        debug!(channel = channel.label(), next_run = %next, "Waiting for next run");
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        info!(channel = channel.label(), "Scheduled run triggered");
        let outcome = runner.run(&channel, Utc::now()).await;
        report::log_outcome(&channel, &outcome);
        last_fire = Some(next);
    }
}
