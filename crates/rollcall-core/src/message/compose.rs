use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::assignment::{OnCallAssignment, Roster};
use crate::channel::{PostingMode, TopicFallback};
use crate::ids::ScheduleId;

use super::format;
use super::payload::{Assignee, Block, ChatPayload, Line, ScheduleSection, SectionStyle, ShiftLabel};
use super::{NO_ONE_ON_CALL_TOPIC, NO_SCHEDULE_FOUND};

const STATUS_HEADER: &str = "🚨 On-Call Status";
const SINGLE_HEADER: &str = "🚨 On-Call Engineer";
const MULTI_HEADER: &str = "🚨 Today's On-Call Engineers";
const ROLL_UP_HEADER: &str = "🚨 Who's On-Call Today?";
const TOPIC_PREFIX: &str = "🚨 On-call:";

#[derive(Debug, Clone)]
pub struct ComposeContext {
    pub as_of: DateTime<Utc>,
    /// Zone for the footer stamp, the roll-up date line and "until" times.
    pub zone: Option<Tz>,
    /// Schedule shown standalone at the top of a roll-up.
    pub highlight: Option<ScheduleId>,
    pub topic_when_empty: TopicFallback,
    pub footer_note: Option<String>,
}

impl ComposeContext {
    pub fn new(as_of: DateTime<Utc>, zone: Option<Tz>) -> Self {
        Self {
            as_of,
            zone,
            highlight: None,
            topic_when_empty: TopicFallback::default(),
            footer_note: None,
        }
    }

    fn footer(&self) -> Block {
        let stamp = format!("Updated: {}", format::timestamp(self.as_of, self.zone.as_ref()));
        match &self.footer_note {
            Some(note) => Block::Footer(format!("{stamp} | {note}")),
            None => Block::Footer(stamp),
        }
    }
}

pub fn compose(rosters: &[Roster], mode: PostingMode, ctx: &ComposeContext) -> ChatPayload {
    match mode {
        PostingMode::TopicOnly => ChatPayload::topic_only(topic_text(rosters, ctx)),
        PostingMode::MessageOnly => detailed(rosters, ctx, None),
        PostingMode::Full => detailed(rosters, ctx, topic_text(rosters, ctx)),
        PostingMode::RollUpAll => roll_up(rosters, ctx),
    }
}

fn detailed(rosters: &[Roster], ctx: &ComposeContext, topic: Option<String>) -> ChatPayload {
    if rosters.is_empty() {
        let blocks = vec![
            Block::Header(STATUS_HEADER.into()),
            Block::Notice(NO_SCHEDULE_FOUND.into()),
            ctx.footer(),
        ];
        return ChatPayload::new(STATUS_HEADER.into(), blocks, topic);
    }

    let header = if rosters.len() == 1 {
        SINGLE_HEADER
    } else {
        MULTI_HEADER
    };
    let mut blocks = vec![Block::Header(header.into()), Block::Divider];
    for (index, roster) in rosters.iter().enumerate() {
        if index > 0 {
            blocks.push(Block::Divider);
        }
        let zone = roster.schedule().time_zone().or(ctx.zone.as_ref());
        let lines = lines(roster, |a| {
            a.shift()
                .map(|shift| ShiftLabel::Range(format::shift_range(shift, zone)))
        });
        blocks.push(Block::Schedule(ScheduleSection {
            title: roster.schedule().name().to_string(),
            emoji: roster.emoji().map(str::to_string),
            style: SectionStyle::Detailed,
            lines,
        }));
    }
    blocks.push(ctx.footer());

    ChatPayload::new(header.into(), blocks, topic)
}

fn roll_up(rosters: &[Roster], ctx: &ComposeContext) -> ChatPayload {
    let date = format::long_date(ctx.as_of, ctx.zone.as_ref());
    let mut blocks = vec![
        Block::Header(ROLL_UP_HEADER.into()),
        Block::Context(format!("📅 {date}")),
    ];

    if rosters.is_empty() {
        blocks.push(Block::Notice(NO_SCHEDULE_FOUND.into()));
        blocks.push(ctx.footer());
        return ChatPayload::new(format!("On-Call Schedule - {date}"), blocks, None);
    }

    let until = |a: &OnCallAssignment| {
        a.shift()
            .map(|shift| ShiftLabel::Until(format::until(shift.end(), ctx.zone.as_ref())))
    };

    // a highlighted schedule nobody covers stays in the regular list
    let highlighted = ctx.highlight.as_ref().and_then(|id| {
        rosters
            .iter()
            .find(|r| r.schedule().id() == id && !r.is_vacant())
    });
    if let Some(roster) = highlighted {
        blocks.push(Block::Schedule(ScheduleSection {
            title: roster.schedule().name().to_string(),
            emoji: roster.emoji().map(str::to_string),
            style: SectionStyle::Highlighted,
            lines: lines(roster, until),
        }));
        blocks.push(Block::Divider);
    }

    let mut rest: Vec<&Roster> = rosters
        .iter()
        .filter(|r| highlighted.map_or(true, |h| h.schedule().id() != r.schedule().id()))
        .collect();
    rest.sort_by(|a, b| roll_up_order(a, b));

    for roster in rest {
        blocks.push(Block::Schedule(ScheduleSection {
            title: roster.schedule().name().to_string(),
            emoji: roster.emoji().map(str::to_string),
            style: SectionStyle::Compact,
            lines: lines(roster, until),
        }));
    }
    blocks.push(Block::Divider);
    blocks.push(ctx.footer());

    ChatPayload::new(format!("On-Call Schedule - {date}"), blocks, None)
}

/// Priority schedules first, then by name ignoring case.
fn roll_up_order(a: &Roster, b: &Roster) -> Ordering {
    b.is_priority()
        .cmp(&a.is_priority())
        .then_with(|| {
            a.schedule()
                .name()
                .to_lowercase()
                .cmp(&b.schedule().name().to_lowercase())
        })
        .then_with(|| a.schedule().name().cmp(b.schedule().name()))
        .then_with(|| a.schedule().id().cmp(b.schedule().id()))
}

fn lines<F>(roster: &Roster, shift_label: F) -> Vec<Line>
where
    F: Fn(&OnCallAssignment) -> Option<ShiftLabel>,
{
    if roster.is_vacant() {
        return vec![Line::Vacant];
    }
    roster
        .assignments()
        .iter()
        .map(|a| {
            Line::Assignee(Assignee {
                name: a.user().name().to_string(),
                chat_user_id: a.user().chat_user_id().cloned(),
                email: a.user().email().map(str::to_string),
                shift: shift_label(a),
            })
        })
        .collect()
}

fn topic_text(rosters: &[Roster], ctx: &ComposeContext) -> Option<String> {
    if rosters.iter().all(Roster::is_vacant) {
        return match ctx.topic_when_empty {
            TopicFallback::Placeholder => Some(format!("{TOPIC_PREFIX} {NO_ONE_ON_CALL_TOPIC}")),
            TopicFallback::Skip => None,
        };
    }

    let names = |roster: &Roster| -> String {
        if roster.is_vacant() {
            return "no one".to_string();
        }
        roster
            .assignments()
            .iter()
            .map(|a| a.user().name())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let body = match rosters {
        [only] => names(only),
        _ => rosters
            .iter()
            .map(|r| format!("{}: {}", r.schedule().name(), names(r)))
            .collect::<Vec<_>>()
            .join(" | "),
    };
    Some(format!("{TOPIC_PREFIX} {body}"))
}
