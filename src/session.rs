//! Signed-in user and login modal visibility.
//!
//! Held by the application root and handed to whatever needs to gate on it;
//! there is no global session. Sign-in is a stub that accepts a fixed user.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub credits: u32,
}

/// The account every sign-in resolves to.
pub fn mock_user() -> User {
    User {
        id: "1".to_string(),
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        credits: 200,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Option<User>,
    login_modal_open: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn login_modal_open(&self) -> bool {
        self.login_modal_open
    }

    /// Sign in; also dismisses the login modal.
    pub fn login(&mut self, user: User) {
        tracing::info!(user = %user.name, "Signed in");
        self.user = Some(user);
        self.login_modal_open = false;
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.name, "Signed out");
        }
    }

    pub fn open_login_modal(&mut self) {
        self.login_modal_open = true;
    }

    pub fn close_login_modal(&mut self) {
        self.login_modal_open = false;
    }

    /// `true` when signed in; otherwise opens the login modal.
    pub fn require_auth(&mut self) -> bool {
        if self.is_authenticated() {
            return true;
        }
        tracing::debug!("Action requires sign-in, opening login modal");
        self.login_modal_open = true;
        false
    }

}
