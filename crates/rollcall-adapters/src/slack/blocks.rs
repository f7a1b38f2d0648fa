//! Block Kit rendering of the composed message.

use serde_json::{json, Value};

use rollcall_core::message::{Assignee, Block, Line, ScheduleSection, SectionStyle, ShiftLabel};

const DEFAULT_EMOJI: &str = "📋";
const NO_ONE: &str = "_No one scheduled_";

/// Escapes the three characters mrkdwn treats as control sequences.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn render_blocks(blocks: &[Block]) -> Vec<Value> {
    blocks.iter().map(render_block).collect()
}

fn render_block(block: &Block) -> Value {
    match block {
        Block::Header(text) => json!({
            "type": "header",
            "text": { "type": "plain_text", "text": text, "emoji": true }
        }),
        Block::Context(text) => context(escape(text)),
        Block::Footer(text) => context(format!("_{}_", escape(text))),
        Block::Notice(text) => section(format!("_{}_", escape(text))),
        Block::Divider => json!({ "type": "divider" }),
        Block::Schedule(schedule) => section(render_section(schedule)),
    }
}

fn context(text: String) -> Value {
    json!({
        "type": "context",
        "elements": [{ "type": "mrkdwn", "text": text }]
    })
}

fn section(text: String) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text }
    })
}

fn render_section(schedule: &ScheduleSection) -> String {
    let emoji = schedule.emoji.as_deref().unwrap_or(DEFAULT_EMOJI);
    let title = escape(&schedule.title);

    match schedule.style {
        SectionStyle::Detailed => {
            let mut text = format!("*{emoji} {title}*");
            for line in &schedule.lines {
                match line {
                    Line::Assignee(a) => {
                        text.push_str(&format!("\n👤 *Engineer:* {}", who(a)));
                        if let Some(email) = &a.email {
                            text.push_str(&format!(" ({})", escape(email)));
                        }
                        if let Some(shift) = &a.shift {
                            text.push_str(&format!("\n⏰ *Shift:* {}", shift_text(shift)));
                        }
                    }
                    Line::Vacant => text.push_str(&format!("\n👤 {NO_ONE}")),
                }
            }
            text
        }
        SectionStyle::Highlighted => {
            let mut text = format!("{emoji} *{title}* ⭐");
            for line in &schedule.lines {
                text.push_str(&format!("\n🔹 {}", compact_line(line)));
            }
            text
        }
        SectionStyle::Compact => {
            let entries = schedule
                .lines
                .iter()
                .map(compact_line)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{emoji} *{title}*\n      {entries}")
        }
    }
}

fn compact_line(line: &Line) -> String {
    match line {
        Line::Assignee(a) => match &a.shift {
            Some(shift) => format!("{} _{}_", who(a), shift_text(shift)),
            None => who(a),
        },
        Line::Vacant => NO_ONE.to_string(),
    }
}

fn who(assignee: &Assignee) -> String {
    match &assignee.chat_user_id {
        Some(id) => format!("<@{}>", id),
        None => escape(&assignee.name),
    }
}

fn shift_text(shift: &ShiftLabel) -> String {
    escape(&shift.to_string())
}
