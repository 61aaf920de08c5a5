//! services/client/src/views/rooms.rs
//!
//! The study-room list and the create-room form.

use std::collections::BTreeSet;
use studysmarter_core::domain::{Mode, NewRoom, RoomDraft, RoomSummary};
use tracing::{error, info};

use crate::error::{ClientError, FieldErrors};
use crate::views::state::{AppState, Route};

pub const LIST_FAILED: &str = "Failed to load study rooms. Please try again.";

//=========================================================================================
// Listing
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListing {
    pub summary: RoomSummary,
    pub joined: bool,
}

/// Fetches and normalizes the room list, refreshing the local cache.
///
/// On failure the stale cache is not substituted; the caller shows the error.
pub async fn list_rooms(state: &AppState) -> Result<Vec<RoomListing>, ClientError> {
    let token = state.require_token()?;
    let rooms = state.api.list_rooms(&token).await.map_err(|e| {
        error!("Error fetching study rooms: {}", e);
        ClientError::LoadFailed(LIST_FAILED.to_string())
    })?;
    state.prefs.save_cached_rooms(&rooms)?;

    let joined = state.prefs.joined_rooms()?;
    Ok(rooms
        .into_iter()
        .map(|summary| {
            let is_joined = joined.iter().any(|j| summary.matches(&j.room_id));
            RoomListing {
                summary,
                joined: is_joined,
            }
        })
        .collect())
}

/// Case-insensitive match on name or description. An empty query matches all.
pub fn search<'a>(listings: &'a [RoomListing], query: &str) -> Vec<&'a RoomListing> {
    let needle = query.trim().to_lowercase();
    listings
        .iter()
        .filter(|l| {
            needle.is_empty()
                || l.summary.name.to_lowercase().contains(&needle)
                || l.summary.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Distinct tags across the listing, sorted.
pub fn all_tags(listings: &[RoomListing]) -> Vec<String> {
    listings
        .iter()
        .flat_map(|l| l.summary.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

//=========================================================================================
// Create Room
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct CreateRoomForm {
    pub name: String,
    pub capacity: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub mode: String,
    /// Used only when the session has no numeric user id.
    pub creator_id: Option<String>,
}

/// Checks every field and builds the request payload.
pub fn validate(form: &CreateRoomForm, session_user_id: Option<&str>) -> Result<NewRoom, ClientError> {
    let mut errors = FieldErrors::default();

    if form.name.trim().is_empty() {
        errors.add("name", "Room name is required");
    }
    if form.description.trim().is_empty() {
        errors.add("description", "Description is required");
    }

    let capacity = if form.capacity.trim().is_empty() {
        errors.add("capacity", "Capacity is required");
        None
    } else {
        match form.capacity.trim().parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                errors.add("capacity", "Capacity must be a positive number");
                None
            }
        }
    };

    if form.date.trim().is_empty() {
        errors.add("date", "Date is required");
    }
    if form.location.trim().is_empty() {
        errors.add("location", "Location is required");
    }

    let mode = if form.mode.trim().is_empty() {
        errors.add("mode", "Mode is required");
        None
    } else {
        match form.mode.parse::<Mode>() {
            Ok(mode) => Some(mode),
            Err(e) => {
                errors.add("mode", e);
                None
            }
        }
    };

    let creator_id = session_user_id
        .and_then(|id| id.trim().parse::<i64>().ok())
        .or_else(|| {
            form.creator_id
                .as_deref()
                .and_then(|id| id.trim().parse::<i64>().ok())
        });
    if creator_id.is_none() {
        errors.add("creator_id", "Valid user ID is required");
    }

    errors.into_result()?;
    match (capacity, mode, creator_id) {
        (Some(capacity), Some(mode), Some(creator_id)) => Ok(NewRoom {
            name: form.name.trim().to_string(),
            capacity,
            creator_id,
            description: form.description.trim().to_string(),
            date: form.date.trim().to_string(),
            location: form.location.trim().to_string(),
            mode,
        }),
        _ => Err(ClientError::Internal("validated form is incomplete".to_string())),
    }
}

/// A successfully created room and the list route to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub room: RoomDraft,
    pub next: Route,
}

pub async fn create_room(state: &AppState, form: &CreateRoomForm) -> Result<Created, ClientError> {
    let token = state.require_token()?;
    let user_id = state.prefs.session()?.and_then(|s| s.user_id);
    let payload = validate(form, user_id.as_deref())?;

    let room = state.api.create_room(&token, &payload).await.map_err(|e| {
        error!("Error creating study room: {}", e);
        ClientError::from(e)
    })?;
    info!(name = %payload.name, "Study room created successfully.");
    Ok(Created {
        room,
        next: Route::StudyRooms { refresh: true },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CreateRoomForm {
        CreateRoomForm {
            name: "Calc II".into(),
            capacity: "6".into(),
            description: "Series and sequences".into(),
            date: "2024-04-01".into(),
            location: "Library".into(),
            mode: "hybrid".into(),
            creator_id: None,
        }
    }

    #[test]
    fn valid_form_builds_payload() {
        let room = validate(&valid_form(), Some("7")).unwrap();
        assert_eq!(room.capacity, 6);
        assert_eq!(room.creator_id, 7);
        assert_eq!(room.mode, Mode::Hybrid);
    }

    #[test]
    fn every_failing_field_is_reported() {
        let form = CreateRoomForm {
            capacity: "-3".into(),
            ..Default::default()
        };
        let Err(ClientError::Validation(errors)) = validate(&form, None) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get("capacity"), Some("Capacity must be a positive number"));
        for field in ["name", "description", "date", "location", "mode", "creator_id"] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }

    #[test]
    fn manual_creator_id_is_used_without_session_id() {
        let form = CreateRoomForm {
            creator_id: Some("12".into()),
            ..valid_form()
        };
        assert_eq!(validate(&form, Some("current-user")).unwrap().creator_id, 12);
    }

    #[test]
    fn search_matches_name_or_description() {
        let listing = |name: &str, description: &str| RoomListing {
            summary: RoomSummary {
                room_id: 1,
                id: "room-1".into(),
                name: name.into(),
                capacity: 4,
                description: description.into(),
                tags: vec![],
                date: "Flexible".into(),
                time: "Flexible".into(),
                participants: 0,
                location: "Online".into(),
                host: "Anonymous".into(),
                creator_id: None,
            },
            joined: false,
        };
        let rooms = vec![listing("Biology", "cells"), listing("History", "Biology of empires")];
        assert_eq!(search(&rooms, "biology").len(), 2);
        assert_eq!(search(&rooms, "CELLS").len(), 1);
        assert_eq!(search(&rooms, "").len(), 2);
    }
}
