//! services/client/src/prefs.rs
//!
//! The typed Local Preference Store. Wraps a `KeyValueStore` and owns the JSON
//! layout of every structured key.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use studysmarter_core::domain::{AuthGrant, CurrentUser, JoinedRoomRecord, RoomSummary, Session, Status};
use studysmarter_core::ports::{KeyValueStore, PortError, PortResult, StorageKey};
use studysmarter_core::synthesis::LocalOverrides;
use tracing::{debug, warn};

//=========================================================================================
// Stored Records
//=========================================================================================

/// Room ids were historically written both as numbers and as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StoredRoomId {
    Number(i64),
    Text(String),
}

impl StoredRoomId {
    fn into_string(self) -> String {
        match self {
            StoredRoomId::Number(n) => n.to_string(),
            StoredRoomId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JoinedRoomEntry {
    #[serde(rename = "roomId")]
    room_id: StoredRoomId,
    #[serde(rename = "joinedAt", default)]
    joined_at: Option<DateTime<Utc>>,
}

impl JoinedRoomEntry {
    fn to_domain(self) -> JoinedRoomRecord {
        JoinedRoomRecord {
            room_id: self.room_id.into_string(),
            joined_at: self.joined_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

#[derive(Debug, Serialize)]
struct JoinedRoomOut<'a> {
    #[serde(rename = "roomId")]
    room_id: &'a str,
    #[serde(rename = "joinedAt")]
    joined_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedRoomEntry {
    room_id: i64,
    id: String,
    name: String,
    capacity: u32,
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    date: String,
    time: String,
    #[serde(default)]
    participants: u32,
    location: String,
    host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creator_id: Option<i64>,
}

impl CachedRoomEntry {
    fn to_domain(self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id,
            id: self.id,
            name: self.name,
            capacity: self.capacity,
            description: self.description,
            tags: self.tags,
            date: self.date,
            time: self.time,
            participants: self.participants,
            location: self.location,
            host: self.host,
            creator_id: self.creator_id,
        }
    }

    fn from_domain(room: &RoomSummary) -> Self {
        Self {
            room_id: room.room_id,
            id: room.id.clone(),
            name: room.name.clone(),
            capacity: room.capacity,
            description: room.description.clone(),
            tags: room.tags.clone(),
            date: room.date.clone(),
            time: room.time.clone(),
            participants: room.participants,
            location: room.location.clone(),
            host: room.host.clone(),
            creator_id: room.creator_id,
        }
    }
}

/// roomKey -> participantId -> value
type NestedMap = HashMap<String, HashMap<String, String>>;

//=========================================================================================
// Settings Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("'{}' is not a theme (light or dark)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub username: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub phone: Option<String>,
}

//=========================================================================================
// The Repository
//=========================================================================================

/// Typed access to the preference store. Cheap to clone.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn get(&self, key: StorageKey) -> PortResult<Option<String>> {
        Ok(self.store.get(key)?.filter(|v| !v.is_empty()))
    }

    /// Reads a JSON key. Absent or malformed values read as the default.
    fn read_json<T: DeserializeOwned + Default>(&self, key: StorageKey) -> PortResult<T> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring malformed stored value.");
                Ok(T::default())
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> PortResult<()> {
        let json = serde_json::to_string(value).map_err(|e| PortError::Storage(e.to_string()))?;
        self.store.set(key, &json)
    }

    // --- Session ---

    pub fn token(&self) -> PortResult<Option<String>> {
        self.get(StorageKey::Token)
    }

    pub fn session(&self) -> PortResult<Option<Session>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        Ok(Some(Session {
            token,
            user_id: self.get(StorageKey::UserId)?,
            username: self.get(StorageKey::Username)?,
            email: self.get(StorageKey::Email)?,
        }))
    }

    pub fn current_user(&self) -> PortResult<CurrentUser> {
        Ok(CurrentUser::new(
            self.get(StorageKey::UserId)?,
            self.get(StorageKey::Username)?,
        ))
    }

    /// Stores a fresh login or signup. Fields the server omitted are left alone.
    pub fn save_grant(&self, grant: &AuthGrant) -> PortResult<()> {
        self.store.set(StorageKey::Token, &grant.token)?;
        if let Some(username) = &grant.username {
            self.store.set(StorageKey::Username, username)?;
        }
        if let Some(email) = &grant.email {
            self.store.set(StorageKey::Email, email)?;
        }
        if let Some(user_id) = &grant.user_id {
            self.store.set(StorageKey::UserId, user_id)?;
        }
        debug!(user_id = ?grant.user_id, "Saved session.");
        Ok(())
    }

    /// Forgets the token and username. Everything else stays for the next login.
    pub fn clear_session(&self) -> PortResult<()> {
        self.store.remove(StorageKey::Token)?;
        self.store.remove(StorageKey::Username)
    }

    // --- Joined Rooms ---

    pub fn joined_rooms(&self) -> PortResult<Vec<JoinedRoomRecord>> {
        let entries: Vec<JoinedRoomEntry> = self.read_json(StorageKey::JoinedStudyRooms)?;
        Ok(entries.into_iter().map(JoinedRoomEntry::to_domain).collect())
    }

    fn write_joined_rooms(&self, records: &[JoinedRoomRecord]) -> PortResult<()> {
        let out: Vec<JoinedRoomOut<'_>> = records
            .iter()
            .map(|r| JoinedRoomOut {
                room_id: &r.room_id,
                joined_at: r.joined_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            })
            .collect();
        self.write_json(StorageKey::JoinedStudyRooms, &out)
    }

    pub fn is_joined(&self, room_id: &str) -> PortResult<bool> {
        Ok(self.joined_rooms()?.iter().any(|r| r.room_id == room_id))
    }

    /// Records a join. Returns false when the room was already recorded.
    pub fn add_joined_room(&self, room_id: &str) -> PortResult<bool> {
        let mut records = self.joined_rooms()?;
        if records.iter().any(|r| r.room_id == room_id) {
            return Ok(false);
        }
        records.push(JoinedRoomRecord {
            room_id: room_id.to_string(),
            joined_at: Utc::now(),
        });
        self.write_joined_rooms(&records)?;
        Ok(true)
    }

    /// Drops a join record. Returns false when there was nothing to drop.
    pub fn remove_joined_room(&self, room_id: &str) -> PortResult<bool> {
        let mut records = self.joined_rooms()?;
        let before = records.len();
        records.retain(|r| r.room_id != room_id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_joined_rooms(&records)?;
        Ok(true)
    }

    // --- Room List Cache ---

    pub fn cached_rooms(&self) -> PortResult<Vec<RoomSummary>> {
        let entries: Vec<CachedRoomEntry> = self.read_json(StorageKey::StudyRooms)?;
        Ok(entries.into_iter().map(CachedRoomEntry::to_domain).collect())
    }

    pub fn save_cached_rooms(&self, rooms: &[RoomSummary]) -> PortResult<()> {
        let entries: Vec<CachedRoomEntry> = rooms.iter().map(CachedRoomEntry::from_domain).collect();
        self.write_json(StorageKey::StudyRooms, &entries)
    }

    pub fn find_cached_room(&self, room_id: &str) -> PortResult<Option<RoomSummary>> {
        Ok(self.cached_rooms()?.into_iter().find(|r| r.matches(room_id)))
    }

    // --- Participant Overrides ---

    pub fn overrides(&self) -> PortResult<LocalOverrides> {
        let raw_statuses: NestedMap = self.read_json(StorageKey::ParticipantStatuses)?;
        let statuses = raw_statuses
            .into_iter()
            .map(|(room, entries)| {
                let parsed = entries
                    .into_iter()
                    .filter_map(|(pid, status)| status.parse::<Status>().ok().map(|s| (pid, s)))
                    .collect();
                (room, parsed)
            })
            .collect();
        let avatars = self.read_json(StorageKey::ParticipantAvatars)?;
        Ok(LocalOverrides { statuses, avatars })
    }

    fn set_nested(&self, key: StorageKey, room_key: &str, participant_id: &str, value: String) -> PortResult<()> {
        let mut all: NestedMap = self.read_json(key)?;
        all.entry(room_key.to_string())
            .or_default()
            .insert(participant_id.to_string(), value);
        self.write_json(key, &all)
    }

    pub fn set_status_override(&self, room_key: &str, participant_id: &str, status: Status) -> PortResult<()> {
        self.set_nested(StorageKey::ParticipantStatuses, room_key, participant_id, status.to_string())
    }

    pub fn set_avatar_override(&self, room_key: &str, participant_id: &str, avatar: &str) -> PortResult<()> {
        self.set_nested(StorageKey::ParticipantAvatars, room_key, participant_id, avatar.to_string())
    }

    // --- Settings & Profile ---

    pub fn theme(&self) -> PortResult<Theme> {
        Ok(self
            .get(StorageKey::Theme)?
            .and_then(|t| t.parse().ok())
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> PortResult<()> {
        self.store.set(StorageKey::Theme, &theme.to_string())
    }

    pub fn profile(&self) -> PortResult<Profile> {
        Ok(Profile {
            username: self.get(StorageKey::Username)?,
            email: self.get(StorageKey::Email)?,
            gender: self.get(StorageKey::Gender)?,
            region: self.get(StorageKey::Region)?,
            phone: self.get(StorageKey::Phone)?,
        })
    }

    /// Saves the editable profile fields. `None` clears a field.
    pub fn save_profile_details(
        &self,
        gender: Option<&str>,
        region: Option<&str>,
        phone: Option<&str>,
    ) -> PortResult<()> {
        self.store.set(StorageKey::Gender, gender.unwrap_or(""))?;
        self.store.set(StorageKey::Region, region.unwrap_or(""))?;
        self.store.set(StorageKey::Phone, phone.unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Preferences::new(store))
    }

    #[test]
    fn join_records_have_set_semantics() {
        let (_, prefs) = prefs();
        assert!(prefs.add_joined_room("42").unwrap());
        assert!(!prefs.add_joined_room("42").unwrap());
        assert_eq!(prefs.joined_rooms().unwrap().len(), 1);

        assert!(prefs.remove_joined_room("42").unwrap());
        assert!(!prefs.remove_joined_room("42").unwrap());
        assert!(prefs.joined_rooms().unwrap().is_empty());
    }

    #[test]
    fn legacy_numeric_room_ids_are_read() {
        let (store, prefs) = prefs();
        store
            .set(
                StorageKey::JoinedStudyRooms,
                r#"[{"roomId":42,"joinedAt":"2024-03-09T10:00:00.000Z"},{"roomId":"room-7"}]"#,
            )
            .unwrap();
        let joined = prefs.joined_rooms().unwrap();
        assert_eq!(joined[0].room_id, "42");
        assert_eq!(joined[1].room_id, "room-7");
        assert!(prefs.is_joined("42").unwrap());
    }

    #[test]
    fn malformed_json_reads_as_empty() {
        let (store, prefs) = prefs();
        store.set(StorageKey::JoinedStudyRooms, "[{oops").unwrap();
        store.set(StorageKey::ParticipantStatuses, "nope").unwrap();
        assert!(prefs.joined_rooms().unwrap().is_empty());
        assert_eq!(prefs.overrides().unwrap(), LocalOverrides::default());
    }

    #[test]
    fn overrides_skip_unknown_statuses() {
        let (store, prefs) = prefs();
        store
            .set(
                StorageKey::ParticipantStatuses,
                r#"{"42":{"host-1":"away","participant-1":"sleeping"}}"#,
            )
            .unwrap();
        prefs.set_avatar_override("42", "host-1", "data:image/png;base64,AA").unwrap();

        let overrides = prefs.overrides().unwrap();
        assert_eq!(overrides.status_for("42", "host-1"), Some(Status::Away));
        assert_eq!(overrides.status_for("42", "participant-1"), None);
        assert_eq!(overrides.avatar_for("42", "host-1"), Some("data:image/png;base64,AA"));
    }

    #[test]
    fn logout_keeps_user_id_and_email() {
        let (_, prefs) = prefs();
        prefs
            .save_grant(&AuthGrant {
                token: "t1".into(),
                user_id: Some("7".into()),
                username: Some("alex".into()),
                email: Some("a@x.com".into()),
            })
            .unwrap();
        prefs.clear_session().unwrap();
        assert!(prefs.session().unwrap().is_none());
        let user = prefs.current_user().unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.name, CurrentUser::FALLBACK_NAME);
        assert_eq!(prefs.profile().unwrap().email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn theme_defaults_to_light() {
        let (_, prefs) = prefs();
        assert_eq!(prefs.theme().unwrap(), Theme::Light);
        prefs.set_theme(Theme::Dark).unwrap();
        assert_eq!(prefs.theme().unwrap(), Theme::Dark);
    }
}
