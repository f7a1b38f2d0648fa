use tracing::{error, info, warn};

use rollcall_core::channel::ChannelConfig;
use rollcall_ports::types::{RunOutcome, RunStatus};

/// One line per run, for the immediate commands' stdout.
pub fn describe(channel: &ChannelConfig, outcome: &RunOutcome) -> String {
    let label = channel.label();
    match outcome.status {
        RunStatus::Failed => {
            let reason = outcome
                .errors
                .last()
                .map(|f| format!("{} failed: {}", f.step.as_str(), f.message))
                .unwrap_or_else(|| "failed".to_string());
            format!("❌ {label}: {reason}")
        }
        RunStatus::Done => {
            let mut done = Vec::new();
            if outcome.posted {
                done.push("posted");
            }
            if outcome.topic_updated {
                done.push("topic updated");
            }
            if outcome.pinned {
                done.push("pinned");
            }
            let actions = if done.is_empty() {
                "nothing to do".to_string()
            } else {
                done.join(", ")
            };
            if outcome.errors.is_empty() {
                format!("✅ {label}: {actions}")
            } else {
                format!("⚠️ {label}: {actions} ({} warning(s))", outcome.errors.len())
            }
        }
    }
}

pub fn log_outcome(channel: &ChannelConfig, outcome: &RunOutcome) {
    let label = channel.label();
    for failure in &outcome.errors {
        warn!(channel = label, step = failure.step.as_str(), error = %failure.message, "Step failed");
    }
    match outcome.status {
        RunStatus::Done => info!(
            channel = label,
            posted = outcome.posted,
            topic_updated = outcome.topic_updated,
            pinned = outcome.pinned,
            "Run finished"
        ),
        RunStatus::Failed => error!(channel = label, "Run failed"),
    }
}
