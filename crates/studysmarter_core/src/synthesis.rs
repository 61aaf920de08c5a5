//! crates/studysmarter_core/src/synthesis.rs
//!
//! Turns a partial room record into a complete, renderable `StudyRoom`.
//!
//! Synthesis never fails: whatever the API or the cache did not provide is
//! filled from fixed defaults, and locally persisted participant overrides are
//! layered on top.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::{
    CurrentUser, JoinedRoomRecord, Material, Message, Mode, Participant, ParticipantDraft, Role,
    RoomDraft, Status, StudyRoom, Visibility, DEFAULT_AVATAR,
};

/// Sample avatars matching this fragment are never shown.
pub const DISALLOWED_AVATAR_PATTERN: &str = "mystical-forest";

pub const DEFAULT_CAPACITY: u32 = 10;
pub const DEFAULT_LOCATION: &str = "Online";

/// Whether a room came from the live API or was materialized from cache/defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOrigin {
    Live,
    Fallback,
}

/// Per-room participant overrides, indexed by room key then participant id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalOverrides {
    pub statuses: HashMap<String, HashMap<String, Status>>,
    pub avatars: HashMap<String, HashMap<String, String>>,
}

impl LocalOverrides {
    pub fn status_for(&self, room_key: &str, participant_id: &str) -> Option<Status> {
        self.statuses
            .get(room_key)
            .and_then(|m| m.get(participant_id))
            .copied()
    }

    pub fn avatar_for(&self, room_key: &str, participant_id: &str) -> Option<&str> {
        self.avatars
            .get(room_key)
            .and_then(|m| m.get(participant_id))
            .map(String::as_str)
    }
}

/// Everything synthesis reads besides the draft itself.
pub struct SynthesisContext<'a> {
    /// The id the view was opened with.
    pub requested_id: &'a str,
    pub joined: &'a [JoinedRoomRecord],
    pub user: &'a CurrentUser,
    pub overrides: &'a LocalOverrides,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedRoom {
    pub room: StudyRoom,
    pub is_joined: bool,
}

/// Builds the full room model for `draft`.
pub fn synthesize(draft: &RoomDraft, ctx: &SynthesisContext<'_>) -> SynthesizedRoom {
    let is_joined = is_joined(draft, ctx.requested_id, ctx.joined);

    let mut participants = match &draft.participants {
        Some(list) => list.iter().map(coerce_participant).collect(),
        None => seed_participants(),
    };

    if is_joined && !participants.iter().any(|p| p.id == ctx.user.id) {
        participants.push(ctx.user.as_participant());
    }

    let id = non_empty(&draft.id)
        .map(str::to_string)
        .or_else(|| known_room_id(draft).map(|n| n.to_string()))
        .unwrap_or_else(|| ctx.requested_id.to_string());

    for p in participants.iter_mut() {
        if let Some(status) = ctx.overrides.status_for(&id, &p.id) {
            p.status = status;
        }
        if let Some(avatar) = ctx.overrides.avatar_for(&id, &p.id) {
            if !avatar.is_empty() {
                p.avatar = avatar.to_string();
            }
        }
    }

    let room_id = known_room_id(draft).or_else(|| id.trim().parse().ok().filter(|n: &i64| *n != 0));
    let name = non_empty(&draft.name)
        .or_else(|| non_empty(&draft.title))
        .unwrap_or("Study Room");

    let room = StudyRoom {
        room_id,
        name: name.to_string(),
        description: non_empty(&draft.description)
            .unwrap_or("A collaborative study session for students.")
            .to_string(),
        tags: draft
            .tags
            .clone()
            .unwrap_or_else(|| vec!["Study".to_string(), "Collaboration".to_string()]),
        visibility: draft
            .visibility
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Visibility::Public),
        date: non_empty(&draft.date)
            .map(str::to_string)
            .unwrap_or_else(|| ctx.today.format("%m/%d/%Y").to_string()),
        time: non_empty(&draft.time).unwrap_or("2:00 PM - 4:00 PM").to_string(),
        duration: non_empty(&draft.duration).unwrap_or("2 hours").to_string(),
        capacity: draft
            .capacity
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_CAPACITY),
        location: non_empty(&draft.location)
            .unwrap_or(DEFAULT_LOCATION)
            .to_string(),
        mode: draft
            .mode
            .as_deref()
            .and_then(|m| m.parse().ok())
            .unwrap_or(Mode::Online),
        participants,
        messages: seed_messages(),
        materials: seed_materials(),
        creator_id: draft.creator_id.filter(|c| *c != 0).unwrap_or(1),
        id,
    };

    SynthesizedRoom { room, is_joined }
}

/// True when any joined record names the requested id or the draft's room id.
pub fn is_joined(draft: &RoomDraft, requested_id: &str, joined: &[JoinedRoomRecord]) -> bool {
    let room_id = known_room_id(draft).map(|n| n.to_string());
    joined.iter().any(|jr| {
        jr.room_id == requested_id || room_id.as_deref() == Some(jr.room_id.as_str())
    })
}

/// The draft's numeric room id. Zero is the list's placeholder for "none".
fn known_room_id(draft: &RoomDraft) -> Option<i64> {
    draft.room_id.filter(|n| *n != 0)
}

fn coerce_participant(p: &ParticipantDraft) -> Participant {
    let avatar = match p.avatar.as_deref() {
        Some(a) if !a.is_empty() && !a.contains(DISALLOWED_AVATAR_PATTERN) => a.to_string(),
        _ => DEFAULT_AVATAR.to_string(),
    };
    Participant {
        id: p.id.clone(),
        name: p.name.clone().unwrap_or_default(),
        avatar,
        role: Role::coerce(p.role.as_deref()),
        status: p
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Status::Online),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn participant(id: &str, name: &str, role: Role, status: Status) -> Participant {
    Participant {
        id: id.to_string(),
        name: name.to_string(),
        avatar: DEFAULT_AVATAR.to_string(),
        role,
        status,
    }
}

/// The host plus two sample participants.
pub fn seed_participants() -> Vec<Participant> {
    vec![
        participant("host-1", "Room Host", Role::Host, Status::Online),
        participant("participant-1", "Alex Johnson", Role::Participant, Status::Online),
        participant("participant-2", "Maria Garcia", Role::Participant, Status::Away),
    ]
}

pub fn seed_messages() -> Vec<Message> {
    vec![
        Message {
            id: "msg-1".to_string(),
            user_id: "host-1".to_string(),
            user_name: "Room Host".to_string(),
            user_avatar: DEFAULT_AVATAR.to_string(),
            content: "Welcome to the study room! Feel free to ask questions.".to_string(),
            timestamp: "10:30 AM".to_string(),
        },
        Message {
            id: "msg-2".to_string(),
            user_id: "participant-1".to_string(),
            user_name: "Alex Johnson".to_string(),
            user_avatar: DEFAULT_AVATAR.to_string(),
            content: "Thanks for setting this up! I'm struggling with the concepts from chapter 5."
                .to_string(),
            timestamp: "10:35 AM".to_string(),
        },
    ]
}

pub fn seed_materials() -> Vec<Material> {
    vec![
        Material {
            id: "material-1".to_string(),
            name: "Study Guide.pdf".to_string(),
            kind: "PDF".to_string(),
            size: "2.4 MB".to_string(),
            uploaded_by: "Room Host".to_string(),
            uploaded_at: "Yesterday".to_string(),
        },
        Material {
            id: "material-2".to_string(),
            name: "Practice Problems.docx".to_string(),
            kind: "DOCX".to_string(),
            size: "1.1 MB".to_string(),
            uploaded_by: "Alex Johnson".to_string(),
            uploaded_at: "Today".to_string(),
        },
    ]
}
