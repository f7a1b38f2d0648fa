//! Turns resolved rosters into a platform-neutral chat payload.
//!
//! Composition is pure: the same rosters, mode and context always produce the
//! same [`ChatPayload`]. Platform adapters render [`Block`]s into their own
//! markup.

mod compose;
mod format;
mod payload;

pub use compose::{compose, ComposeContext};
pub use format::shift_range;
pub use payload::{Assignee, Block, ChatPayload, Line, ScheduleSection, SectionStyle, ShiftLabel};

pub const NO_ONE_SCHEDULED: &str = "No one scheduled";
pub const NO_SCHEDULE_FOUND: &str = "No on-call schedule found or no one is currently on-call.";
pub const NO_ONE_ON_CALL_TOPIC: &str = "no one is currently on-call";
