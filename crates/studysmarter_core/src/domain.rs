//! crates/studysmarter_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or wire format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Avatar shown whenever a participant has no usable picture.
pub const DEFAULT_AVATAR: &str = "/default-profile-photo.jpg";

/// The authenticated user, as remembered by the local preference store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// The user a room view acts on behalf of.
///
/// Falls back to placeholder identity when the store has no user id or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
}

impl CurrentUser {
    pub const FALLBACK_ID: &'static str = "current-user";
    pub const FALLBACK_NAME: &'static str = "Current User";

    pub fn new(id: Option<String>, name: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| Self::FALLBACK_ID.to_string()),
            name: name.unwrap_or_else(|| Self::FALLBACK_NAME.to_string()),
        }
    }

    /// The participant entry added to a room when this user joins it.
    pub fn as_participant(&self) -> Participant {
        Participant {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: DEFAULT_AVATAR.to_string(),
            role: Role::Participant,
            status: Status::Online,
        }
    }
}

/// Returned by the API after a successful login or signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Host,
    Participant,
}

impl Role {
    /// Anything other than an explicit "host" is a plain participant.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some("host") => Role::Host,
            _ => Role::Participant,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Participant => write!(f, "participant"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Online,
    Away,
    Offline,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Online => write!(f, "online"),
            Status::Away => write!(f, "away"),
            Status::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Status::Online),
            "away" => Ok(Status::Away),
            "offline" => Ok(Status::Offline),
            other => Err(format!("'{}' is not a participant status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("'{}' is not a room visibility", other)),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// How a study session is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Online,
    Offline,
    Hybrid,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Mode::Online),
            "offline" => Ok(Mode::Offline),
            "hybrid" => Ok(Mode::Hybrid),
            other => Err(format!("'{}' is not a room mode", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Online => write!(f, "online"),
            Mode::Offline => write!(f, "offline"),
            Mode::Hybrid => write!(f, "hybrid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub role: Role,
    pub status: Status,
}

/// A single chat line in a room. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    pub timestamp: String,
}

/// A shared file listed in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub size: String,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

/// A fully populated, renderable study room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyRoom {
    pub id: String,
    pub room_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub capacity: u32,
    pub location: String,
    pub mode: Mode,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
    pub materials: Vec<Material>,
    pub creator_id: i64,
}

impl StudyRoom {
    /// The identifier recorded in the joined-rooms list: the numeric room id
    /// when known and non-zero, else the string id.
    pub fn join_identifier(&self) -> String {
        self.room_id
            .filter(|n| *n != 0)
            .map(|n| n.to_string())
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }
}

/// A participant as reported by the API, before coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantDraft {
    pub id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// A partial room record: whatever the API (or the list cache) knew.
///
/// `participants` is `None` when the source carried no participant array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomDraft {
    pub id: Option<String>,
    pub room_id: Option<i64>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<String>,
    pub capacity: Option<u32>,
    pub location: Option<String>,
    pub mode: Option<String>,
    pub participants: Option<Vec<ParticipantDraft>>,
    pub creator_id: Option<i64>,
}

impl RoomDraft {
    /// The minimal draft used when neither the API nor the cache knows the room.
    pub fn mock(requested_id: &str) -> Self {
        Self {
            room_id: requested_id.trim().parse().ok(),
            name: Some("Study Room".to_string()),
            capacity: Some(10),
            ..Default::default()
        }
    }
}

/// A normalized entry of the study-room list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: i64,
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub description: String,
    pub tags: Vec<String>,
    pub date: String,
    pub time: String,
    pub participants: u32,
    pub location: String,
    pub host: String,
    pub creator_id: Option<i64>,
}

impl RoomSummary {
    /// True when `candidate` names this room by either identifier. A zero
    /// room id means the server sent none and never matches.
    pub fn matches(&self, candidate: &str) -> bool {
        (self.room_id != 0 && self.room_id.to_string() == candidate) || self.id == candidate
    }

    /// A cached summary carries no participant array, so synthesis seeds it.
    pub fn to_draft(&self) -> RoomDraft {
        RoomDraft {
            id: Some(self.id.clone()),
            room_id: Some(self.room_id),
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            tags: Some(self.tags.clone()),
            date: Some(self.date.clone()),
            time: Some(self.time.clone()),
            capacity: Some(self.capacity),
            location: Some(self.location.clone()),
            creator_id: self.creator_id,
            ..Default::default()
        }
    }
}

/// The payload sent to create a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: String,
    pub capacity: u32,
    pub creator_id: i64,
    pub description: String,
    pub date: String,
    pub location: String,
    pub mode: Mode,
}

/// Marks that the current user has joined a room. Set semantics on `room_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoomRecord {
    pub room_id: String,
    pub joined_at: DateTime<Utc>,
}
