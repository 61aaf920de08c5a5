//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use studysmarter_core::ports::PortError;

/// Field name to message, for form validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), ClientError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A storage or API failure reported through a core port.
    #[error("{0}")]
    Port(#[from] PortError),

    /// Login or signup was refused; carries the message shown to the user.
    #[error("{0}")]
    Auth(String),

    /// Client-side checks rejected a form before it was sent.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// No session token is stored; the user has to log in first.
    #[error("Not logged in")]
    NotAuthenticated,

    /// Chat and materials need the user to have joined the room.
    #[error("Join the room to participate in the chat")]
    NotJoined,

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// A page-level load failed; carries the message shown to the user.
    #[error("{0}")]
    LoadFailed(String),

    /// The room view has not finished loading, or failed to.
    #[error("Study room not loaded: {0}")]
    NotReady(String),

    /// Represents a standard Input/Output error (e.g. reading an avatar file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
