pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod room_detail;
pub mod rooms;
pub mod state;

// Re-export the pieces the binary and the tests reach for most.
pub use room_detail::{DetailState, RoomDetailController, Tab};
pub use state::{AppState, Route};
