//! HTTP adapter and auth/list flows against a mock StudySmarter server.

use client_lib::adapters::{HttpApiAdapter, MemoryStore};
use client_lib::config::Config;
use client_lib::error::ClientError;
use client_lib::views::auth::{self, LoginForm};
use client_lib::views::rooms::{self, CreateRoomForm};
use client_lib::views::{AppState, Route};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use studysmarter_core::domain::{AuthGrant, Mode, NewRoom};
use studysmarter_core::ports::{KeyValueStore, PortError, StorageKey, StudyApi};

fn adapter(server: &MockServer) -> HttpApiAdapter {
    HttpApiAdapter::new(server.base_url(), Duration::from_secs(5), 0).unwrap()
}

fn app(server: &MockServer) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(Arc::new(adapter(server)), store.clone(), Arc::new(Config::default()));
    (state, store)
}

fn with_token(state: &AppState) {
    state
        .prefs
        .save_grant(&AuthGrant {
            token: "t1".into(),
            user_id: Some("7".into()),
            username: Some("alex".into()),
            email: None,
        })
        .unwrap();
}

#[tokio::test]
async fn login_stores_the_session() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/login")
                .json_body(json!({"email": "a@x.com", "password": "pw"}));
            then.status(200).json_body(json!({
                "access_token": "t1",
                "user": {"id": 7, "username": "alex", "email": "a@x.com"}
            }));
        })
        .await;
    let (state, store) = app(&server);

    let form = LoginForm {
        email: "a@x.com".into(),
        password: "pw".into(),
    };
    let outcome = auth::login(&state, &form).await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.next, Route::Dashboard);
    assert_eq!(store.get(StorageKey::Token).unwrap().as_deref(), Some("t1"));
    assert_eq!(store.get(StorageKey::UserId).unwrap().as_deref(), Some("7"));
    assert_eq!(store.get(StorageKey::Username).unwrap().as_deref(), Some("alex"));
}

#[tokio::test]
async fn rejected_login_shows_the_server_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(401).json_body(json!({"message": "Invalid credentials"}));
        })
        .await;
    let (state, store) = app(&server);

    let form = LoginForm {
        email: "a@x.com".into(),
        password: "wrong".into(),
    };
    match auth::login(&state, &form).await {
        Err(ClientError::Auth(message)) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected auth error, got {:?}", other),
    }
    assert_eq!(store.get(StorageKey::Token).unwrap(), None);
}

#[tokio::test]
async fn empty_login_form_never_reaches_the_server() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(200);
        })
        .await;
    let (state, _) = app(&server);

    let result = auth::login(&state, &LoginForm::default()).await;
    let Err(ClientError::Validation(errors)) = result else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.get("email"), Some("Email is required"));
    assert_eq!(errors.get("password"), Some("Password is required"));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn signup_without_token_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signup");
            then.status(201).json_body(json!({"id": 3}));
        })
        .await;

    let err = adapter(&server).signup("sam", "s@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, PortError::InvalidResponse(m) if m.contains("authentication token is missing")));
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_fails() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/logout").header("authorization", "Bearer t1");
            then.status(500);
        })
        .await;
    let (state, store) = app(&server);
    with_token(&state);

    assert_eq!(auth::logout(&state).await.unwrap(), Route::Login);
    mock.assert_async().await;
    assert_eq!(store.get(StorageKey::Token).unwrap(), None);
    assert_eq!(store.get(StorageKey::Username).unwrap(), None);
    assert_eq!(store.get(StorageKey::UserId).unwrap().as_deref(), Some("7"));
}

#[tokio::test]
async fn wrapped_room_list_is_cached_and_marks_joined_rooms() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/study_rooms").header("authorization", "Bearer t1");
            then.status(200).json_body(json!({"rooms": [
                {"room_id": 1, "name": "Biology", "capacity": 5, "participants": 2},
                {"room_id": 2, "description": "Integrals"}
            ]}));
        })
        .await;
    let (state, _) = app(&server);
    with_token(&state);
    state.prefs.add_joined_room("2").unwrap();

    let listings = rooms::list_rooms(&state).await.unwrap();
    assert_eq!(listings.len(), 2);
    assert!(!listings[0].joined);
    assert!(listings[1].joined);
    assert_eq!(listings[1].summary.name, "Unnamed Room");

    let cached = state.prefs.find_cached_room("room-1").unwrap().unwrap();
    assert_eq!(cached.name, "Biology");
}

#[tokio::test]
async fn failed_room_list_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/study_rooms");
            then.status(401);
        })
        .await;
    let (state, _) = app(&server);
    with_token(&state);

    match rooms::list_rooms(&state).await {
        Err(ClientError::LoadFailed(message)) => assert_eq!(message, rooms::LIST_FAILED),
        other => panic!("expected load failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/study_rooms/42");
            then.status(404);
        })
        .await;

    let err = adapter(&server).get_room("t1", "42").await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn room_without_identifier_is_invalid() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/study_rooms/9");
            then.status(200).json_body(json!({"name": "No id"}));
        })
        .await;

    let err = adapter(&server).get_room("t1", "9").await.unwrap_err();
    assert!(matches!(err, PortError::InvalidResponse(m) if m == "Invalid room data format"));
}

#[tokio::test]
async fn create_room_surfaces_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/study_rooms");
            then.status(400).json_body(json!({"error": "capacity too large"}));
        })
        .await;

    let room = NewRoom {
        name: "Calc".into(),
        capacity: 500,
        creator_id: 7,
        description: "Limits".into(),
        date: "2024-04-01".into(),
        location: "Library".into(),
        mode: Mode::Offline,
    };
    let err = adapter(&server).create_room("t1", &room).await.unwrap_err();
    assert_eq!(err.to_string(), "API Error: capacity too large");
}

#[tokio::test]
async fn create_room_sends_the_form_and_returns_to_the_list() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/study_rooms").json_body(json!({
                "name": "Calc II",
                "capacity": 6,
                "creator_id": 7,
                "description": "Series",
                "date": "2024-04-01",
                "location": "Library",
                "mode": "hybrid"
            }));
            then.status(201).json_body(json!({"room_id": 11, "name": "Calc II"}));
        })
        .await;
    let (state, _) = app(&server);
    with_token(&state);

    let form = CreateRoomForm {
        name: "Calc II".into(),
        capacity: "6".into(),
        description: "Series".into(),
        date: "2024-04-01".into(),
        location: "Library".into(),
        mode: "hybrid".into(),
        creator_id: None,
    };
    let created = rooms::create_room(&state, &form).await.unwrap();

    mock.assert_async().await;
    assert_eq!(created.room.room_id, Some(11));
    assert_eq!(created.next, Route::StudyRooms { refresh: true });
}

fn impatient(server: &MockServer, retries: u32) -> HttpApiAdapter {
    HttpApiAdapter::new(server.base_url(), Duration::from_millis(100), retries).unwrap()
}

#[tokio::test]
async fn timed_out_get_is_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/study_rooms/42");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"room_id": 42}));
        })
        .await;

    let err = impatient(&server, 1).get_room("t1", "42").await.unwrap_err();
    assert!(matches!(err, PortError::Network(_)));
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn timed_out_posts_are_sent_once() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"access_token": "t1"}));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/study_rooms");
            then.status(201).delay(Duration::from_millis(500));
        })
        .await;
    let api = impatient(&server, 3);

    let err = api.login("a@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, PortError::Network(_)));
    login.assert_hits_async(1).await;

    let room = NewRoom {
        name: "Calc".into(),
        capacity: 4,
        creator_id: 7,
        description: "Limits".into(),
        date: "2024-04-01".into(),
        location: "Library".into(),
        mode: Mode::Online,
    };
    let err = api.create_room("t1", &room).await.unwrap_err();
    assert!(matches!(err, PortError::Network(_)));
    create.assert_hits_async(1).await;
}

#[tokio::test]
async fn refused_signup_is_a_form_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signup");
            then.status(409).json_body(json!({"message": "Email already registered"}));
        })
        .await;
    let (state, store) = app(&server);

    let form = auth::SignupForm {
        username: "sam".into(),
        email: "s@x.com".into(),
        password: "pw".into(),
    };
    match auth::signup(&state, &form).await {
        Err(ClientError::Validation(errors)) => {
            assert_eq!(errors.get("form"), Some("Email already registered"))
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(store.get(StorageKey::Token).unwrap(), None);
}
