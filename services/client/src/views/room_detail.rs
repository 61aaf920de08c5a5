//! services/client/src/views/room_detail.rs
//!
//! The study-room detail view: fetch, synthesize, then apply user actions and
//! write the persistent parts back to the preference store.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Local;
use std::path::Path;
use std::time::{Duration, Instant};
use studysmarter_core::domain::{Message, RoomDraft, Status, StudyRoom, DEFAULT_AVATAR};
use studysmarter_core::ports::{PortError, PortResult};
use studysmarter_core::synthesis::{synthesize, RoomOrigin, SynthesisContext};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{ClientError, FieldErrors};
use crate::views::state::AppState;

pub const LOAD_FAILED: &str = "Failed to load study room data. Please try again.";

//=========================================================================================
// View State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chat,
    Materials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Joined,
    Left,
}

/// A transient confirmation that hides itself after `ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    shown_at: Instant,
    ttl: Duration,
}

impl Banner {
    fn new(kind: BannerKind, ttl: Duration) -> Self {
        Self {
            kind,
            shown_at: Instant::now(),
            ttl,
        }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            BannerKind::Joined => "You have successfully joined the study room!",
            BannerKind::Left => "You have left the study room.",
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.ttl
    }
}

/// A loaded room and everything the view layers on top of it.
#[derive(Debug, Clone)]
pub struct RoomDetail {
    pub room: StudyRoom,
    pub origin: RoomOrigin,
    pub is_joined: bool,
    pub active_tab: Tab,
    banner: Option<Banner>,
}

#[derive(Debug, Clone)]
pub enum DetailState {
    Loading,
    Ready(RoomDetail),
    /// Terminal until the view is reopened.
    Error(String),
}

fn ready_mut(view: &mut DetailState) -> Result<&mut RoomDetail, ClientError> {
    match view {
        DetailState::Ready(detail) => Ok(detail),
        DetailState::Loading => Err(ClientError::NotReady("still loading".to_string())),
        DetailState::Error(message) => Err(ClientError::NotReady(message.clone())),
    }
}

//=========================================================================================
// The Controller
//=========================================================================================

pub struct RoomDetailController {
    app: AppState,
    room_id: String,
    view: DetailState,
}

impl RoomDetailController {
    pub fn new(app: AppState, room_id: impl Into<String>) -> Self {
        Self {
            app,
            room_id: room_id.into(),
            view: DetailState::Loading,
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.view
    }

    pub fn detail(&self) -> Option<&RoomDetail> {
        match &self.view {
            DetailState::Ready(detail) => Some(detail),
            _ => None,
        }
    }

    /// Fetches the room and moves to `Ready` (live or fallback) or `Error`.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.load_until(&CancellationToken::new()).await.map(|_| ())
    }

    /// Like `load`, but gives up when `cancel` fires first.
    ///
    /// Returns `Ok(false)` when cancelled; the view is then left untouched.
    pub async fn load_until(&mut self, cancel: &CancellationToken) -> Result<bool, ClientError> {
        let token = self.app.require_token()?;

        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(room_id = %self.room_id, "Room load cancelled.");
                return Ok(false);
            }
            result = self.app.api.get_room(&token, &self.room_id) => result,
        };

        self.view = self.resolve(fetched)?;
        Ok(true)
    }

    fn resolve(&self, fetched: PortResult<RoomDraft>) -> Result<DetailState, ClientError> {
        let (draft, origin) = match fetched {
            Ok(draft) => (draft, RoomOrigin::Live),
            Err(PortError::InvalidResponse(detail)) => {
                error!(room_id = %self.room_id, "Error fetching room data: {}", detail);
                return Ok(DetailState::Error(LOAD_FAILED.to_string()));
            }
            Err(e) => {
                warn!(room_id = %self.room_id, error = %e, "Failed to fetch study room data, using fallback.");
                (self.fallback_draft()?, RoomOrigin::Fallback)
            }
        };

        let prefs = &self.app.prefs;
        let joined = prefs.joined_rooms()?;
        let user = prefs.current_user()?;
        let overrides = prefs.overrides()?;
        let ctx = SynthesisContext {
            requested_id: &self.room_id,
            joined: &joined,
            user: &user,
            overrides: &overrides,
            today: Local::now().date_naive(),
        };
        let synthesized = synthesize(&draft, &ctx);
        info!(
            room_id = %synthesized.room.id,
            ?origin,
            is_joined = synthesized.is_joined,
            "Study room ready."
        );

        Ok(DetailState::Ready(RoomDetail {
            room: synthesized.room,
            origin,
            is_joined: synthesized.is_joined,
            active_tab: Tab::default(),
            banner: None,
        }))
    }

    /// The cached list entry for this room, or a minimal mock.
    fn fallback_draft(&self) -> Result<RoomDraft, ClientError> {
        Ok(match self.app.prefs.find_cached_room(&self.room_id)? {
            Some(cached) => cached.to_draft(),
            None => RoomDraft::mock(&self.room_id),
        })
    }

    // --- Membership ---

    /// Records the join, then adds the user to the room. A failed store write
    /// leaves the view unchanged.
    pub fn join(&mut self) -> Result<(), ClientError> {
        let user = self.app.prefs.current_user()?;
        let ttl = self.app.config.banner_dismiss;
        let detail = ready_mut(&mut self.view)?;

        let identifier = detail.room.join_identifier();
        self.app.prefs.add_joined_room(&identifier)?;

        if detail.room.participant(&user.id).is_none() {
            detail.room.participants.push(user.as_participant());
        }
        detail.is_joined = true;
        detail.banner = Some(Banner::new(BannerKind::Joined, ttl));
        info!(room_id = %identifier, user_id = %user.id, "Joined study room.");
        Ok(())
    }

    pub fn leave(&mut self) -> Result<(), ClientError> {
        let user = self.app.prefs.current_user()?;
        let ttl = self.app.config.banner_dismiss;
        let detail = ready_mut(&mut self.view)?;

        let identifier = detail.room.join_identifier();
        self.app.prefs.remove_joined_room(&identifier)?;

        detail.room.participants.retain(|p| p.id != user.id);
        detail.is_joined = false;
        detail.banner = Some(Banner::new(BannerKind::Left, ttl));
        info!(room_id = %identifier, user_id = %user.id, "Left study room.");
        Ok(())
    }

    /// The banner still showing at `now`, if any.
    pub fn banner_at(&self, now: Instant) -> Option<&Banner> {
        self.detail()
            .and_then(|d| d.banner.as_ref())
            .filter(|b| b.is_visible_at(now))
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner_at(Instant::now())
    }

    // --- Chat & Tabs ---

    pub fn select_tab(&mut self, tab: Tab) -> Result<(), ClientError> {
        ready_mut(&mut self.view)?.active_tab = tab;
        Ok(())
    }

    /// Appends a chat message from the current user. Only members may post.
    pub fn send_message(&mut self, content: &str) -> Result<&Message, ClientError> {
        let user = self.app.prefs.current_user()?;
        let detail = ready_mut(&mut self.view)?;

        if !detail.is_joined {
            return Err(ClientError::NotJoined);
        }
        if content.trim().is_empty() {
            let mut errors = FieldErrors::default();
            errors.add("message", "Message cannot be empty");
            return Err(ClientError::Validation(errors));
        }

        detail.room.messages.push(Message {
            id: format!("msg-{}", Uuid::new_v4()),
            user_id: user.id,
            user_name: user.name,
            user_avatar: DEFAULT_AVATAR.to_string(),
            content: content.to_string(),
            timestamp: Local::now().format("%I:%M %p").to_string(),
        });
        detail
            .room
            .messages
            .last()
            .ok_or_else(|| ClientError::Internal("message was not appended".to_string()))
    }

    // --- Participant Overrides ---

    /// Fallback rooms are freely editable; live rooms only for the user's own entry.
    pub fn can_edit(&self, participant_id: &str) -> Result<bool, ClientError> {
        let Some(detail) = self.detail() else {
            return Ok(false);
        };
        if detail.origin == RoomOrigin::Fallback {
            return Ok(true);
        }
        Ok(self.app.prefs.current_user()?.id == participant_id)
    }

    fn check_editable(&self, participant_id: &str) -> Result<(), ClientError> {
        let detail = match &self.view {
            DetailState::Ready(detail) => detail,
            _ => return Err(ClientError::NotReady("room is not loaded".to_string())),
        };
        if detail.room.participant(participant_id).is_none() {
            return Err(ClientError::Port(PortError::NotFound(format!(
                "Participant {} not in room",
                participant_id
            ))));
        }
        if !self.can_edit(participant_id)? {
            return Err(ClientError::NotPermitted(format!(
                "cannot edit participant {} in a live room",
                participant_id
            )));
        }
        Ok(())
    }

    pub fn set_status(&mut self, participant_id: &str, status: Status) -> Result<(), ClientError> {
        self.check_editable(participant_id)?;
        let detail = ready_mut(&mut self.view)?;
        if let Some(p) = detail.room.participants.iter_mut().find(|p| p.id == participant_id) {
            p.status = status;
        }
        self.app
            .prefs
            .set_status_override(&detail.room.id, participant_id, status)?;
        debug!(room_id = %detail.room.id, participant_id, %status, "Saved participant status.");
        Ok(())
    }

    pub fn set_avatar(&mut self, participant_id: &str, avatar: &str) -> Result<(), ClientError> {
        self.check_editable(participant_id)?;
        let detail = ready_mut(&mut self.view)?;
        if let Some(p) = detail.room.participants.iter_mut().find(|p| p.id == participant_id) {
            p.avatar = avatar.to_string();
        }
        self.app
            .prefs
            .set_avatar_override(&detail.room.id, participant_id, avatar)?;
        debug!(room_id = %detail.room.id, participant_id, "Saved participant avatar.");
        Ok(())
    }

    /// Reads an image file and stores it as the participant's avatar data URI.
    pub async fn upload_avatar(&mut self, participant_id: &str, path: &Path) -> Result<(), ClientError> {
        self.check_editable(participant_id)?;
        let mime = image_mime(path).ok_or_else(|| {
            let mut errors = FieldErrors::default();
            errors.add("avatar", "Avatar must be an image file");
            ClientError::Validation(errors)
        })?;
        let bytes = tokio::fs::read(path).await?;
        let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));
        self.set_avatar(participant_id, &data_uri)
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_hides_after_ttl() {
        let banner = Banner::new(BannerKind::Joined, Duration::from_millis(3000));
        assert!(banner.is_visible_at(banner.shown_at));
        assert!(banner.is_visible_at(banner.shown_at + Duration::from_millis(2999)));
        assert!(!banner.is_visible_at(banner.shown_at + Duration::from_millis(3000)));
    }

    #[test]
    fn image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("me.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("me.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("noext")), None);
    }
}
