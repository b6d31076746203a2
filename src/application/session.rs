//! Per-user session data handed explicitly to whoever needs it.

use std::collections::BTreeMap;
use tracing::info;

/// Key the selected GBLOC is stored under.
pub const SELECTED_GBLOC_KEY: &str = "selected_gbloc";

/// Who is logged in and what they picked, passed by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<String>,
    values: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `user`, dropping anything from a previous one.
    pub fn login(&mut self, user: impl Into<String>) {
        let user = user.into();
        info!(%user, "session started");
        self.values.clear();
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(%user, "session ended");
        }
        self.values.clear();
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn select_gbloc(&mut self, gbloc: impl Into<String>) {
        self.values.insert(SELECTED_GBLOC_KEY.to_string(), gbloc.into());
    }

    pub fn selected_gbloc(&self) -> Option<&str> {
        self.get(SELECTED_GBLOC_KEY)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}
