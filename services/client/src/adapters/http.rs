//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `StudyApi` port from the `core` crate. Every call goes through one
//! `reqwest::Client` with a shared timeout and retry policy.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use studysmarter_core::domain::{AuthGrant, NewRoom, ParticipantDraft, RoomDraft, RoomSummary};
use studysmarter_core::ports::{PortError, PortResult, StudyApi};
use tracing::{debug, info, warn};

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `StudyApi` port against the StudySmarter REST API.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HttpApiAdapter {
    /// Creates a new `HttpApiAdapter`.
    pub fn new(base_url: impl Into<String>, timeout: Duration, retries: u32) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retries,
        })
    }

    pub fn from_config(config: &Config) -> PortResult<Self> {
        Self::new(
            config.api_url.clone(),
            config.request_timeout,
            config.request_retries,
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends `request`, retrying transport failures when `idempotent`.
    async fn send(&self, request: RequestBuilder, idempotent: bool) -> PortResult<Response> {
        let attempts = if idempotent { self.retries + 1 } else { 1 };
        let mut last_error = String::from("request was never sent");

        for attempt in 1..=attempts {
            let Some(req) = request.try_clone() else {
                return Err(PortError::Unexpected("request cannot be cloned".to_string()));
            };
            match req.send().await {
                Ok(response) => {
                    debug!(status = %response.status(), url = %response.url(), "Received response.");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Request failed before a response.");
                    last_error = e.to_string();
                }
            }
        }
        Err(PortError::Network(last_error))
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

/// A JSON scalar the API sends either as a number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) => Some(*f as i64),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: Option<Scalar>,
    username: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthRecord {
    access_token: Option<String>,
    user: Option<UserRecord>,
    id: Option<Scalar>,
    username: Option<String>,
    email: Option<String>,
}

impl AuthRecord {
    fn to_domain(self) -> Option<AuthGrant> {
        let token = self.access_token.filter(|t| !t.is_empty())?;
        let (user_id, username, email) = match self.user {
            Some(user) => (
                user.id.or(self.id).map(|id| id.as_text()),
                user.username.or(self.username),
                user.email.or(self.email),
            ),
            None => (self.id.map(|id| id.as_text()), self.username, self.email),
        };
        Some(AuthGrant {
            token,
            user_id,
            username,
            email,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ParticipantRecord {
    id: Scalar,
    name: Option<String>,
    avatar: Option<String>,
    role: Option<String>,
    status: Option<String>,
}

impl ParticipantRecord {
    fn to_domain(self) -> ParticipantDraft {
        ParticipantDraft {
            id: self.id.as_text(),
            name: self.name,
            avatar: self.avatar,
            role: self.role,
            status: self.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RoomRecord {
    id: Option<Scalar>,
    room_id: Option<Scalar>,
    name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    visibility: Option<String>,
    date: Option<String>,
    time: Option<String>,
    duration: Option<String>,
    capacity: Option<Scalar>,
    location: Option<String>,
    mode: Option<String>,
    /// An array of participants on the detail endpoint, a head count on the list.
    participants: Option<Value>,
    host: Option<String>,
    creator_id: Option<Scalar>,
}

impl RoomRecord {
    fn capacity(&self) -> Option<u32> {
        self.capacity
            .as_ref()
            .and_then(Scalar::as_i64)
            .and_then(|n| u32::try_from(n).ok())
    }

    fn to_domain(self) -> RoomDraft {
        let capacity = self.capacity();
        let participants = match self.participants {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value::<ParticipantRecord>(item).ok())
                    .map(ParticipantRecord::to_domain)
                    .collect(),
            ),
            _ => None,
        };
        RoomDraft {
            id: self.id.map(|s| s.as_text()),
            room_id: self.room_id.as_ref().and_then(Scalar::as_i64),
            name: self.name,
            title: self.title,
            description: self.description,
            tags: self.tags,
            visibility: self.visibility,
            date: self.date,
            time: self.time,
            duration: self.duration,
            capacity,
            location: self.location,
            mode: self.mode,
            participants,
            creator_id: self.creator_id.as_ref().and_then(Scalar::as_i64),
        }
    }

    /// Normalizes a list entry, filling every gap with the list defaults.
    fn to_summary(self) -> RoomSummary {
        let capacity = self.capacity().unwrap_or(0);
        let room_id = self.room_id.as_ref().and_then(Scalar::as_i64).unwrap_or(0);
        let id = self
            .id
            .map(|s| s.as_text())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                if room_id != 0 {
                    format!("room-{}", room_id)
                } else {
                    format!("room-{}", &uuid::Uuid::new_v4().simple().to_string()[..9])
                }
            });
        let participants = match &self.participants {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
            Some(Value::Array(items)) => u32::try_from(items.len()).unwrap_or(u32::MAX),
            _ => 0,
        };
        let or = |value: Option<String>, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        RoomSummary {
            room_id,
            id,
            name: or(self.name, "Unnamed Room"),
            capacity,
            description: or(self.description, "No description available"),
            tags: Vec::new(),
            date: or(self.date, "Flexible"),
            time: or(self.time, "Flexible"),
            participants,
            location: or(self.location, "Online"),
            host: or(self.host, "Anonymous"),
            creator_id: self.creator_id.as_ref().and_then(Scalar::as_i64),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoomList {
    Bare(Vec<RoomRecord>),
    Wrapped { rooms: Option<Vec<RoomRecord>> },
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateRoomRequest<'a> {
    name: &'a str,
    capacity: u32,
    creator_id: i64,
    description: &'a str,
    date: &'a str,
    location: &'a str,
    mode: String,
}

impl<'a> From<&'a NewRoom> for CreateRoomRequest<'a> {
    fn from(room: &'a NewRoom) -> Self {
        Self {
            name: &room.name,
            capacity: room.capacity,
            creator_id: room.creator_id,
            description: &room.description,
            date: &room.date,
            location: &room.location,
            mode: room.mode.to_string(),
        }
    }
}

//=========================================================================================
// Response Helpers
//=========================================================================================

async fn read_body(response: Response) -> PortResult<(StatusCode, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PortError::Network(e.to_string()))?;
    Ok((status, body))
}

fn rejected(status: StatusCode, body: &str, fallback: &str) -> PortError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    PortError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn parse_grant(body: &str, missing_token: &str) -> PortResult<AuthGrant> {
    let record: AuthRecord =
        serde_json::from_str(body).map_err(|e| PortError::InvalidResponse(e.to_string()))?;
    record
        .to_domain()
        .ok_or_else(|| PortError::InvalidResponse(missing_token.to_string()))
}

//=========================================================================================
// `StudyApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyApi for HttpApiAdapter {
    async fn login(&self, email: &str, password: &str) -> PortResult<AuthGrant> {
        let request = self
            .request(Method::POST, "/login", None)
            .json(&LoginRequest { email, password });
        let (status, body) = read_body(self.send(request, false).await?).await?;

        if !status.is_success() {
            return Err(rejected(status, &body, "Login failed"));
        }
        let mut grant = parse_grant(&body, "Login succeeded but authentication token is missing")?;
        if grant.email.is_none() {
            grant.email = Some(email.to_string());
        }
        info!(user_id = ?grant.user_id, "Logged in.");
        Ok(grant)
    }

    async fn signup(&self, username: &str, email: &str, password: &str) -> PortResult<AuthGrant> {
        let request = self.request(Method::POST, "/signup", None).json(&SignupRequest {
            username,
            email,
            password,
        });
        let (status, body) = read_body(self.send(request, false).await?).await?;

        if status != StatusCode::CREATED {
            return Err(rejected(status, &body, "Signup failed"));
        }
        let grant = parse_grant(&body, "Signup succeeded but authentication token is missing")?;
        info!(user_id = ?grant.user_id, "Signed up.");
        Ok(grant)
    }

    async fn logout(&self, token: &str) -> PortResult<()> {
        let request = self.request(Method::POST, "/logout", Some(token));
        let (status, body) = read_body(self.send(request, false).await?).await?;
        if !status.is_success() {
            return Err(rejected(status, &body, "Logout failed"));
        }
        Ok(())
    }

    async fn list_rooms(&self, token: &str) -> PortResult<Vec<RoomSummary>> {
        let request = self
            .request(Method::GET, "/study_rooms", Some(token))
            .header(reqwest::header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(reqwest::header::PRAGMA, "no-cache");
        let (status, body) = read_body(self.send(request, true).await?).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(PortError::Unauthorized);
        }
        if !status.is_success() {
            return Err(rejected(status, &body, "Failed to fetch study rooms"));
        }
        let list: RoomList =
            serde_json::from_str(&body).map_err(|e| PortError::InvalidResponse(e.to_string()))?;
        let records = match list {
            RoomList::Bare(records) => records,
            RoomList::Wrapped { rooms } => rooms.unwrap_or_default(),
        };
        debug!(count = records.len(), "Fetched study rooms.");
        Ok(records.into_iter().map(RoomRecord::to_summary).collect())
    }

    async fn get_room(&self, token: &str, room_id: &str) -> PortResult<RoomDraft> {
        let request = self.request(Method::GET, &format!("/study_rooms/{}", room_id), Some(token));
        let (status, body) = read_body(self.send(request, true).await?).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(format!("Study room {} not found", room_id)));
        }
        if !status.is_success() {
            return Err(rejected(status, &body, "Failed to fetch study room"));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| PortError::InvalidResponse(e.to_string()))?;
        let has_id = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
        if !(has_id("room_id") || has_id("id")) {
            return Err(PortError::InvalidResponse("Invalid room data format".to_string()));
        }
        let record: RoomRecord =
            serde_json::from_value(value).map_err(|e| PortError::InvalidResponse(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn create_room(&self, token: &str, room: &NewRoom) -> PortResult<RoomDraft> {
        let request = self
            .request(Method::POST, "/study_rooms", Some(token))
            .json(&CreateRoomRequest::from(room));
        let (status, body) = read_body(self.send(request, false).await?).await?;

        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = match (parsed.error, parsed.message) {
                (Some(error), _) if !error.is_empty() => format!("API Error: {}", error),
                (_, Some(message)) if !message.is_empty() => message,
                _ => "Failed to create study room".to_string(),
            };
            return Err(PortError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let record: RoomRecord = serde_json::from_str(&body).unwrap_or_default();
        info!(room_id = ?record.room_id.as_ref().map(Scalar::as_text), "Created study room.");
        Ok(record.to_domain())
    }
}
