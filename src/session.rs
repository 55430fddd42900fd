//! Buyer sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Bearer token issued by the marketplace on login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
}

impl SessionToken {
    /// Wrap a raw token.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(**redacted**)")
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// The logged-in buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,
}

/// An authenticated buyer and their token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token
    pub token: SessionToken,

    /// Buyer profile
    pub user: UserProfile,
}

impl Session {
    /// Create a session.
    pub fn new(token: SessionToken, user: UserProfile) -> Self {
        Self { token, user }
    }
}

/// Whether a buyer is logged in, and as whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    current: Option<Session>,
}

impl SessionState {
    /// Replace any current session with `session`.
    pub fn login(&mut self, session: Session) -> &Session {
        self.current.insert(session)
    }

    /// Drop the session, returning it if there was one.
    pub fn logout(&mut self) -> Option<Session> {
        self.current.take()
    }

    /// The active session.
    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Whether a buyer is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            SessionToken::new("secret-token"),
            UserProfile {
                id: "u-1".to_string(),
                name: "Sari".to_string(),
                email: "sari@example.com".to_string(),
            },
        )
    }

    #[test]
    fn debug_output_redacts_token() {
        let debug = format!("{:?}", session());

        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("**redacted**"));
    }

    #[test]
    fn login_then_logout() {
        let mut state = SessionState::default();

        assert!(!state.is_authenticated());

        let user = state.login(session()).user.name.clone();

        assert_eq!(user, "Sari");
        assert_eq!(
            state.session().map(|s| s.token.expose()),
            Some("secret-token")
        );

        let ended = state.logout();

        assert!(ended.is_some());
        assert!(!state.is_authenticated());
        assert!(state.logout().is_none());
    }
}
