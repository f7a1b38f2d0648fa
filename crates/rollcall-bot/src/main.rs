//! rollcall - posts who is on call to chat channels on a schedule.

mod config;
mod logging;
mod report;
mod scheduler;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use rollcall_adapters::datadog::DatadogClient;
use rollcall_adapters::slack::SlackClient;
use rollcall_app::orchestrator::PostingOrchestrator;
use rollcall_core::channel::ChannelConfig;
use rollcall_core::ids::ScheduleId;
use rollcall_core::message::shift_range;
use rollcall_ports::inbound::ChannelRunner;
use rollcall_ports::outbound::ScheduleProvider;

use config::{env_lookup, Settings, DEFAULT_CONFIG_PATH};

type Orchestrator = PostingOrchestrator<DatadogClient, DatadogClient, SlackClient>;

const DIAGNOSTIC_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts the current on-call engineers to chat channels.
#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Scheduled on-call announcements for chat channels")]
#[command(version)]
struct Cli {
    /// Channel configuration file
    #[arg(long, global = true, env = "ROLLCALL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every channel on its cron schedule until interrupted (default)
    Start,

    /// Post to every channel once, right now
    #[command(visible_alias = "test")]
    Now {
        /// Only this channel id
        #[arg(long)]
        channel: Option<String>,

        /// Print the message instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the provider's on-call schedules
    Schedules,

    /// Show on-call assignments over the coming hours
    Upcoming {
        /// Window length in hours
        #[arg(long, default_value = "24")]
        hours: i64,

        /// Restrict to these schedule ids
        #[arg(long = "schedule")]
        schedules: Vec<String>,
    },

    /// Verify the provider and chat credentials
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command.unwrap_or(Commands::Start) {
        Commands::Start => start(&cli.config).await,
        Commands::Now { channel, dry_run } => now(&cli.config, channel.as_deref(), dry_run).await,
        Commands::Schedules => list_schedules().await,
        Commands::Upcoming { hours, schedules } => upcoming(hours, &schedules).await,
        Commands::Check => check().await,
    }
}

fn build_orchestrator(settings: &Settings) -> Result<Orchestrator> {
    let datadog = DatadogClient::new(&config::datadog_config(&env_lookup, settings.request_timeout)?)?;
    let slack = SlackClient::new(config::slack_token(&env_lookup)?, settings.request_timeout)?;
    Ok(PostingOrchestrator::new(
        datadog.clone(),
        datadog,
        slack,
        settings.orchestrator_settings(),
    ))
}

fn datadog_only() -> Result<DatadogClient> {
    Ok(DatadogClient::new(&config::datadog_config(
        &env_lookup,
        DIAGNOSTIC_TIMEOUT,
    )?)?)
}

async fn start(path: &std::path::Path) -> Result<ExitCode> {
    let settings = Settings::load(path, &env_lookup)?;
    let orchestrator = build_orchestrator(&settings)?;
    let plan = scheduler::plan(settings.channels).map_err(|e| anyhow!(e))?;

    info!(channels = plan.len(), "rollcall starting");
    let runner: Arc<dyn ChannelRunner> = Arc::new(orchestrator);
    let mut tasks = scheduler::spawn_all(runner, plan);

    tokio::select! {
        () = async { tokio::signal::ctrl_c().await.ok(); } => {
            info!("Received SIGINT, shutting down");
        }
        () = async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "Channel task ended unexpectedly");
                }
            }
        } => {
            warn!("All channel tasks exited");
        }
    }
    tasks.shutdown().await;
    Ok(ExitCode::SUCCESS)
}

async fn now(path: &std::path::Path, only: Option<&str>, dry_run: bool) -> Result<ExitCode> {
    let settings = Settings::load(path, &env_lookup)?;
    let channels: Vec<&ChannelConfig> = match only {
        Some(id) => vec![settings
            .channel(id)
            .ok_or_else(|| anyhow!("channel {id} is not configured"))?],
        None => settings.channels.iter().collect(),
    };
    let orchestrator = build_orchestrator(&settings)?;
    let as_of = Utc::now();

    let mut failed = false;
    for channel in channels {
        if dry_run {
            match orchestrator.preview(channel, as_of).await {
                Ok(payload) => {
                    println!("── {} ({}) ──", channel.label(), channel.mode());
                    if !payload.blocks().is_empty() {
                        println!("{}", payload.plain_text());
                    }
                    if let Some(topic) = payload.topic_text() {
                        println!("topic: {topic}");
                    }
                    println!();
                }
                Err(e) => {
                    error!(channel = channel.label(), error = %e, "Preview failed");
                    println!("❌ {}: {e}", channel.label());
                    failed = true;
                }
            }
            continue;
        }

        let outcome = orchestrator.run(channel, as_of).await;
        report::log_outcome(channel, &outcome);
        println!("{}", report::describe(channel, &outcome));
        failed |= outcome.is_failed();
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn list_schedules() -> Result<ExitCode> {
    let datadog = datadog_only()?;
    let schedules = datadog
        .list_schedules()
        .await
        .context("failed to list schedules")?;

    if schedules.is_empty() {
        println!("No on-call schedules found.");
    }
    for (i, schedule) in schedules.iter().enumerate() {
        println!("{}. {}", i + 1, schedule.name());
        println!("   ID: {}", schedule.id());
        if let Some(tz) = schedule.time_zone() {
            println!("   Time zone: {}", tz.name());
        }
    }
    println!("\nTotal: {} schedule(s)", schedules.len());
    Ok(ExitCode::SUCCESS)
}

async fn upcoming(hours: i64, schedules: &[String]) -> Result<ExitCode> {
    let datadog = datadog_only()?;
    let ids = schedules
        .iter()
        .map(|s| ScheduleId::parse(s))
        .collect::<Result<Vec<_>, _>>()?;
    let from = Utc::now();
    let to = window_end(from, hours).ok_or_else(|| anyhow!("--hours {hours} is out of range"))?;

    let entries = datadog
        .list_current_on_call(&ids, from, to)
        .await
        .context("failed to list on-call assignments")?;

    if entries.is_empty() {
        println!("Nobody on call in the next {hours}h.");
    }
    for entry in entries {
        let schedule = entry
            .schedule_name
            .unwrap_or_else(|| entry.schedule_id.to_string());
        let who = entry
            .user
            .as_ref()
            .and_then(|u| u.name.clone().or_else(|| u.email.clone()))
            .or_else(|| entry.user_id.as_ref().map(|id| id.to_string()))
            .unwrap_or_else(|| "nobody".to_string());
        match entry.shift {
            Some(shift) => println!("{schedule}: {who} ({})", shift_range(&shift, None)),
            None => println!("{schedule}: {who}"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// End of the `upcoming` window; at least one hour, `None` on overflow.
fn window_end(from: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_hours(hours.max(1)).and_then(|span| from.checked_add_signed(span))
}

async fn check() -> Result<ExitCode> {
    let mut failed = false;

    match datadog_only() {
        Ok(datadog) => match datadog.validate().await {
            Ok(()) => println!("✅ Datadog credentials are valid"),
            Err(e) => {
                println!("❌ Datadog: {e}");
                failed = true;
            }
        },
        Err(e) => {
            println!("❌ Datadog: {e}");
            failed = true;
        }
    }

    let slack = config::slack_token(&env_lookup)
        .map_err(anyhow::Error::from)
        .and_then(|token| Ok(SlackClient::new(token, DIAGNOSTIC_TIMEOUT)?));
    match slack {
        Ok(slack) => match slack.auth_test().await {
            Ok(identity) => println!(
                "✅ Slack token is valid (bot {} in {})",
                identity.user, identity.team
            ),
            Err(e) => {
                println!("❌ Slack: {e}");
                failed = true;
            }
        },
        Err(e) => {
            println!("❌ Slack: {e}");
            failed = true;
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
