use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;

/// Random bytes per bearer token.
const TOKEN_LEN: usize = 32;

/// Maps opaque bearer tokens to logged-in user ids.
///
/// Each user holds at most one live session.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: Mutex<HashMap<String, String>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `user_id` and returns its token.
    ///
    /// Any earlier session of the same user is revoked.
    pub fn issue(&self, user_id: &str) -> String {
        let mut bytes = [0u8; TOKEN_LEN];
        rand::rng().fill(&mut bytes);
        let token = hex::encode(bytes);

        let mut sessions = self.lock();
        sessions.retain(|_, owner| owner.as_str() != user_id);
        sessions.insert(token.clone(), user_id.to_string());
        token
    }

    /// Returns the user id owning `token`, if the session is live.
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.lock().get(token).cloned()
    }

    /// Ends a session. Returns `true` if the token was live.
    pub fn revoke(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are plain strings, so a poisoned table is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
