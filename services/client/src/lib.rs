pub mod adapters;
pub mod config;
pub mod error;
pub mod prefs;
pub mod views;
