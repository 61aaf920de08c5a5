//! services/client/src/views/dashboard.rs
//!
//! Assembles the dashboard widgets for the logged-in user.

use chrono::Local;
use studysmarter_core::dashboard::{
    featured_rooms, sample_discussions, sample_events, week_from, Discussion, FeaturedRoom,
    ScheduleEvent, TodoList, WeekDay,
};

use crate::error::ClientError;
use crate::views::auth::require_session;
use crate::views::state::AppState;

pub struct DashboardView {
    pub username: String,
    pub week: Vec<WeekDay>,
    pub events: Vec<ScheduleEvent>,
    pub todos: TodoList,
    pub discussions: Vec<Discussion>,
    pub featured_rooms: Vec<FeaturedRoom>,
}

pub fn load(state: &AppState) -> Result<DashboardView, ClientError> {
    let session = require_session(state)?;
    Ok(DashboardView {
        username: session.username.unwrap_or_else(|| "Student".to_string()),
        week: week_from(Local::now().date_naive()),
        events: sample_events(),
        todos: TodoList::sample(),
        discussions: sample_discussions(),
        featured_rooms: featured_rooms(),
    })
}
