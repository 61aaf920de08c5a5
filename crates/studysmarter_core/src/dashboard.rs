//! crates/studysmarter_core/src/dashboard.rs
//!
//! Sample content for the dashboard widgets. Each widget is independent.

use chrono::{Datelike, Duration, NaiveDate};

//=========================================================================================
// Upcoming Schedule
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDay {
    pub day_name: &'static str,
    pub day_of_month: u32,
    pub is_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Study,
    Exam,
    Meeting,
    Lab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    pub id: u32,
    pub title: &'static str,
    pub time: &'static str,
    pub kind: EventKind,
    /// Days from today.
    pub day: u32,
    pub status: &'static str,
}

/// Seven consecutive days starting at `today`.
pub fn week_from(today: NaiveDate) -> Vec<WeekDay> {
    (0..7)
        .map(|i| {
            let date = today + Duration::days(i);
            WeekDay {
                day_name: short_day_name(date),
                day_of_month: date.day(),
                is_today: i == 0,
            }
        })
        .collect()
}

fn short_day_name(date: NaiveDate) -> &'static str {
    const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    DAYS[date.weekday().num_days_from_sunday() as usize]
}

pub fn sample_events() -> Vec<ScheduleEvent> {
    vec![
        ScheduleEvent {
            id: 1,
            title: "Biology Study Session",
            time: "10:00 AM - 12:00 PM",
            kind: EventKind::Study,
            day: 0,
            status: "You are well prepared for this study session!",
        },
        ScheduleEvent {
            id: 2,
            title: "Psychology Quiz",
            time: "2:00 PM - 3:00 PM",
            kind: EventKind::Exam,
            day: 1,
            status: "Quiz is scheduled. Don't forget to review Chapter 5!",
        },
        ScheduleEvent {
            id: 3,
            title: "Math Group Meeting",
            time: "4:00 PM - 5:30 PM",
            kind: EventKind::Meeting,
            day: 2,
            status: "Meeting with your study group to discuss problem sets.",
        },
        ScheduleEvent {
            id: 4,
            title: "Chemistry Lab",
            time: "1:00 PM - 3:00 PM",
            kind: EventKind::Lab,
            day: 3,
            status: "Lab safety equipment is ready. Arrive 10 minutes early.",
        },
    ]
}

/// Events falling on the given offset from today.
pub fn events_on(events: &[ScheduleEvent], day: u32) -> Vec<&ScheduleEvent> {
    events.iter().filter(|e| e.day == day).collect()
}

//=========================================================================================
// To-do Reminders
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    tasks: Vec<Task>,
}

impl TodoList {
    pub fn sample() -> Self {
        let task = |id, text: &str, completed| Task {
            id,
            text: text.to_string(),
            completed,
        };
        Self {
            tasks: vec![
                task(1, "Complete Biology assignment", false),
                task(2, "Review Calculus notes for quiz", false),
                task(3, "Prepare presentation for Psychology", true),
                task(4, "Read Chapter 7 of History textbook", false),
            ],
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Flips completion of the task with `id`. Returns false if no such task.
    pub fn toggle(&mut self, id: u32) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }
}

//=========================================================================================
// Community Feed
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discussion {
    pub id: u32,
    pub title: &'static str,
    pub author: &'static str,
    pub replies: u32,
    pub time: &'static str,
}

pub fn sample_discussions() -> Vec<Discussion> {
    vec![
        Discussion {
            id: 1,
            title: "Tips for memorizing biology terms?",
            author: "Alex Chen",
            replies: 12,
            time: "2 hours ago",
        },
        Discussion {
            id: 2,
            title: "Study group for Calculus II final",
            author: "Maria Rodriguez",
            replies: 8,
            time: "Yesterday",
        },
        Discussion {
            id: 3,
            title: "Best resources for Psychology research",
            author: "James Wilson",
            replies: 5,
            time: "2 days ago",
        },
    ]
}

//=========================================================================================
// Study Room Summary
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedRoom {
    pub id: u32,
    pub name: &'static str,
    pub subject: &'static str,
    pub participants: u32,
    pub max_participants: u32,
    pub schedule: &'static str,
    pub venue: &'static str,
    pub mode: &'static str,
}

impl FeaturedRoom {
    pub fn is_full(&self) -> bool {
        self.participants >= self.max_participants
    }
}

pub fn featured_rooms() -> Vec<FeaturedRoom> {
    vec![
        FeaturedRoom {
            id: 1,
            name: "Biology 101 Finals Prep",
            subject: "Biology",
            participants: 8,
            max_participants: 10,
            schedule: "Fri, 10:00 AM - 12:00 PM",
            venue: "Room 201, Science Building",
            mode: "In Person",
        },
        FeaturedRoom {
            id: 2,
            name: "Calculus II Problem Solving",
            subject: "Mathematics",
            participants: 5,
            max_participants: 8,
            schedule: "Sun, 4:00 PM - 5:30 PM",
            venue: "Online (Zoom)",
            mode: "Online",
        },
        FeaturedRoom {
            id: 3,
            name: "Psychology Research Methods",
            subject: "Psychology",
            participants: 4,
            max_participants: 6,
            schedule: "Mon, 1:00 PM - 3:00 PM",
            venue: "Room 105, Psychology Dept.",
            mode: "In Person",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_starts_today() {
        // 2024-03-09 is a Saturday.
        let week = week_from(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(week.len(), 7);
        assert!(week[0].is_today);
        assert_eq!(week[0].day_name, "Sat");
        assert_eq!(week[1].day_name, "Sun");
        assert_eq!(week[1].day_of_month, 10);
        assert!(week[1..].iter().all(|d| !d.is_today));
    }

    #[test]
    fn toggle_flips_only_the_named_task() {
        let mut todos = TodoList::sample();
        assert_eq!(todos.remaining(), 3);
        assert!(todos.toggle(3));
        assert!(!todos.tasks()[2].completed);
        assert_eq!(todos.remaining(), 4);
        assert!(!todos.toggle(99));
        assert_eq!(todos.remaining(), 4);
    }

    #[test]
    fn events_are_grouped_by_day_offset() {
        let events = sample_events();
        assert_eq!(events_on(&events, 1)[0].title, "Psychology Quiz");
        assert!(events_on(&events, 6).is_empty());
    }
}
