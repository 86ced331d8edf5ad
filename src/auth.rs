//! Login gate for the dashboard. Sessions live only for the lifetime of the
//! process; nothing is persisted.

use chrono::{DateTime, Local};
use log::{info, warn};
use thiserror::Error;

use crate::config::Credentials;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not signed in")]
    NotSignedIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub login_time: DateTime<Local>,
}

impl User {
    fn signed_in_now(email: &str) -> Self {
        Self {
            email: email.to_string(),
            login_time: Local::now(),
        }
    }
}

pub trait Authenticator {
    fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError>;
    fn logout(&mut self);
    fn current_user(&self) -> Option<&User>;
}

/// Admits exactly one configured email/password pair. Both must match
/// exactly; no trimming or case folding.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
    user: Option<User>,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            user: None,
        }
    }
}

impl Authenticator for StaticCredentials {
    fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        if email != self.credentials.email || password != self.credentials.password {
            warn!("Rejected sign-in attempt for {email:?}");
            return Err(AuthError::InvalidCredentials);
        }
        info!("Signed in as {email}");
        Ok(&*self.user.insert(User::signed_in_now(email)))
    }

    fn logout(&mut self) {
        self.user = None;
    }

    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Used when no credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct OpenAccess {
    user: Option<User>,
}

impl Authenticator for OpenAccess {
    fn login(&mut self, email: &str, _password: &str) -> Result<&User, AuthError> {
        Ok(&*self.user.insert(User::signed_in_now(email)))
    }

    fn logout(&mut self) {
        self.user = None;
    }

    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Session context handed to the dashboard command.
pub struct Session {
    authenticator: Box<dyn Authenticator>,
}

impl Session {
    pub fn new(authenticator: Box<dyn Authenticator>) -> Self {
        Self { authenticator }
    }

    /// Static credentials when configured, open access otherwise.
    pub fn from_config(credentials: Option<&Credentials>) -> Self {
        match credentials {
            Some(credentials) => Self::new(Box::new(StaticCredentials::new(credentials.clone()))),
            None => Self::new(Box::new(OpenAccess::default())),
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        self.authenticator.login(email, password)
    }

    pub fn logout(&mut self) {
        self.authenticator.logout();
    }

    pub fn current_user(&self) -> Option<&User> {
        self.authenticator.current_user()
    }

    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.current_user().ok_or(AuthError::NotSignedIn)
    }
}
