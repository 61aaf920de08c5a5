//! services/client/src/views/state.rs
//!
//! Defines the application state shared by every view.

use crate::{config::Config, error::ClientError, prefs::Preferences};
use std::fmt;
use std::sync::Arc;
use studysmarter_core::ports::{KeyValueStore, StudyApi};

//=========================================================================================
// AppState (Shared Across All Views)
//=========================================================================================

/// The shared application state, created once at startup and passed to all views.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn StudyApi>,
    pub prefs: Preferences,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(api: Arc<dyn StudyApi>, store: Arc<dyn KeyValueStore>, config: Arc<Config>) -> Self {
        Self {
            api,
            prefs: Preferences::new(store),
            config,
        }
    }

    /// The stored bearer token, or `NotAuthenticated` when nobody is logged in.
    pub fn require_token(&self) -> Result<String, ClientError> {
        self.prefs.token()?.ok_or(ClientError::NotAuthenticated)
    }
}

//=========================================================================================
// Routes
//=========================================================================================

/// Where a view sends the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    StudyRooms { refresh: bool },
    StudyRoom(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::Dashboard => write!(f, "/dashboard"),
            Route::StudyRooms { refresh: false } => write!(f, "/dashboard/study-rooms"),
            Route::StudyRooms { refresh: true } => write!(f, "/dashboard/study-rooms?refresh=true"),
            Route::StudyRoom(id) => write!(f, "/dashboard/study-rooms/{}", id),
        }
    }
}
