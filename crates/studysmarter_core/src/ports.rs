//! crates/studysmarter_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP transport and of where preferences are kept.

use async_trait::async_trait;
use std::fmt;

use crate::domain::{AuthGrant, NewRoom, RoomDraft, RoomSummary};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The server answered with a non-success status and (maybe) a message.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),
    /// A success response whose body could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Local Preference Store
//=========================================================================================

/// Every key the application reads or writes in the preference store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Token,
    Username,
    Email,
    UserId,
    Theme,
    Gender,
    Region,
    Phone,
    JoinedStudyRooms,
    StudyRooms,
    ParticipantStatuses,
    ParticipantAvatars,
}

impl StorageKey {
    pub const ALL: [StorageKey; 12] = [
        StorageKey::Token,
        StorageKey::Username,
        StorageKey::Email,
        StorageKey::UserId,
        StorageKey::Theme,
        StorageKey::Gender,
        StorageKey::Region,
        StorageKey::Phone,
        StorageKey::JoinedStudyRooms,
        StorageKey::StudyRooms,
        StorageKey::ParticipantStatuses,
        StorageKey::ParticipantAvatars,
    ];

    /// The persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Token => "token",
            StorageKey::Username => "username",
            StorageKey::Email => "email",
            StorageKey::UserId => "userId",
            StorageKey::Theme => "theme",
            StorageKey::Gender => "gender",
            StorageKey::Region => "region",
            StorageKey::Phone => "phone",
            StorageKey::JoinedStudyRooms => "joinedStudyRooms",
            StorageKey::StudyRooms => "studyRooms",
            StorageKey::ParticipantStatuses => "participantStatuses",
            StorageKey::ParticipantAvatars => "participantAvatars",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string key-value store. Last write wins; no locking, no expiry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StorageKey) -> PortResult<Option<String>>;

    fn set(&self, key: StorageKey, value: &str) -> PortResult<()>;

    fn remove(&self, key: StorageKey) -> PortResult<()>;
}

//=========================================================================================
// Remote API
//=========================================================================================

#[async_trait]
pub trait StudyApi: Send + Sync {
    // --- Auth ---
    async fn login(&self, email: &str, password: &str) -> PortResult<AuthGrant>;

    async fn signup(&self, username: &str, email: &str, password: &str) -> PortResult<AuthGrant>;

    /// Invalidates the token server-side. Callers treat failures as advisory.
    async fn logout(&self, token: &str) -> PortResult<()>;

    // --- Study Rooms ---
    async fn list_rooms(&self, token: &str) -> PortResult<Vec<RoomSummary>>;

    /// Fetches one room. A 404 is reported as `PortError::NotFound`.
    async fn get_room(&self, token: &str, room_id: &str) -> PortResult<RoomDraft>;

    async fn create_room(&self, token: &str, room: &NewRoom) -> PortResult<RoomDraft>;
}
