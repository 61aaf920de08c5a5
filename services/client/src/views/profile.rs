//! services/client/src/views/profile.rs
//!
//! Profile details and the theme setting.

use tracing::info;

use crate::error::ClientError;
use crate::prefs::{Profile, Theme};
use crate::views::auth::require_session;
use crate::views::state::AppState;

pub fn load_profile(state: &AppState) -> Result<Profile, ClientError> {
    require_session(state)?;
    Ok(state.prefs.profile()?)
}

/// Saves the editable fields. Blank values clear the field.
pub fn update_profile(
    state: &AppState,
    gender: Option<&str>,
    region: Option<&str>,
    phone: Option<&str>,
) -> Result<Profile, ClientError> {
    require_session(state)?;
    fn clean(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }
    state
        .prefs
        .save_profile_details(clean(gender), clean(region), clean(phone))?;
    info!("Profile updated.");
    Ok(state.prefs.profile()?)
}

pub fn set_theme(state: &AppState, theme: Theme) -> Result<Theme, ClientError> {
    state.prefs.set_theme(theme)?;
    Ok(theme)
}

/// Switches between light and dark and returns the new theme.
pub fn toggle_theme(state: &AppState) -> Result<Theme, ClientError> {
    let next = match state.prefs.theme()? {
        Theme::Light => Theme::Dark,
        Theme::Dark => Theme::Light,
    };
    set_theme(state, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{HttpApiAdapter, MemoryStore};
    use crate::config::Config;
    use std::sync::Arc;
    use std::time::Duration;
    use studysmarter_core::domain::AuthGrant;

    fn state() -> AppState {
        let api = HttpApiAdapter::new("http://127.0.0.1:9", Duration::from_secs(1), 0).unwrap();
        let state = AppState::new(Arc::new(api), Arc::new(MemoryStore::new()), Arc::new(Config::default()));
        state
            .prefs
            .save_grant(&AuthGrant {
                token: "t1".into(),
                user_id: Some("7".into()),
                username: Some("alex".into()),
                email: Some("a@x.com".into()),
            })
            .unwrap();
        state
    }

    #[test]
    fn profile_fields_are_trimmed_and_blanks_cleared() {
        let state = state();
        let profile = update_profile(&state, Some(" female "), Some("EU"), Some("555")).unwrap();
        assert_eq!(profile.gender.as_deref(), Some("female"));
        assert_eq!(profile.region.as_deref(), Some("EU"));

        let profile = update_profile(&state, None, Some("  "), Some(" 123 ")).unwrap();
        assert_eq!(profile.gender, None);
        assert_eq!(profile.region, None);
        assert_eq!(profile.phone.as_deref(), Some("123"));
        assert_eq!(profile.username.as_deref(), Some("alex"));
    }

    #[test]
    fn toggle_flips_the_stored_theme() {
        let state = state();
        assert_eq!(toggle_theme(&state).unwrap(), Theme::Dark);
        assert_eq!(toggle_theme(&state).unwrap(), Theme::Light);
    }
}
