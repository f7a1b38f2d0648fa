use serde::{Deserialize, Serialize};

use crate::ids::ScheduleId;
use crate::schedule::{Schedule, ScheduleRef, Shift};
use crate::user::OnCallUser;

/// Who is on duty for one schedule at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCallAssignment {
    schedule_id: ScheduleId,
    schedule_name: String,
    user: OnCallUser,
    shift: Option<Shift>,
}

impl OnCallAssignment {
    pub fn new(schedule: &Schedule, user: OnCallUser, shift: Option<Shift>) -> Self {
        Self {
            schedule_id: schedule.id().clone(),
            schedule_name: schedule.name().to_string(),
            user,
            shift,
        }
    }

    pub fn schedule_id(&self) -> &ScheduleId {
        &self.schedule_id
    }

    pub fn schedule_name(&self) -> &str {
        &self.schedule_name
    }

    pub fn user(&self) -> &OnCallUser {
        &self.user
    }

    pub fn shift(&self) -> Option<&Shift> {
        self.shift.as_ref()
    }
}

/// A resolved schedule with its presentation metadata. An empty
/// `assignments` list means nobody is on call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    schedule: Schedule,
    emoji: Option<String>,
    priority: bool,
    assignments: Vec<OnCallAssignment>,
}

impl Roster {
    pub fn new(schedule: Schedule, reference: &ScheduleRef) -> Self {
        Self {
            schedule: schedule.renamed(reference.name.as_deref()),
            emoji: reference.emoji.clone(),
            priority: reference.priority,
            assignments: vec![],
        }
    }

    pub fn with_assignment(mut self, assignment: OnCallAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn emoji(&self) -> Option<&str> {
        self.emoji.as_deref()
    }

    pub fn is_priority(&self) -> bool {
        self.priority
    }

    pub fn assignments(&self) -> &[OnCallAssignment] {
        &self.assignments
    }

    pub fn is_vacant(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ScheduleId;

    fn schedule() -> Schedule {
        Schedule::new(ScheduleId::parse("s1").unwrap(), "Infrastructure".into(), None)
    }

    #[test]
    fn roster_applies_reference_metadata() {
        let reference = ScheduleRef::new(ScheduleId::parse("s1").unwrap())
            .named("Infra")
            .with_emoji("🛠️")
            .prioritized();
        let roster = Roster::new(schedule(), &reference);
        assert_eq!(roster.schedule().name(), "Infra");
        assert_eq!(roster.emoji(), Some("🛠️"));
        assert!(roster.is_priority());
        assert!(roster.is_vacant());
    }

    #[test]
    fn assignment_carries_schedule_identity() {
        let sched = schedule();
        let assignment = OnCallAssignment::new(&sched, OnCallUser::unknown(), None);
        assert_eq!(assignment.schedule_id().as_str(), "s1");
        assert_eq!(assignment.schedule_name(), "Infrastructure");
        assert_eq!(assignment.user().name(), "Unknown User");
    }
}
