//! Resolution of the visitor's role from the signed session cookie.
//!
//! The cookie holds at most one credential. Writers go through
//! [`SessionStore`], which clears the other role's token whenever one is set,
//! and readers resolve the role anew on every request so that all browser tabs
//! sharing the cookie agree on who is signed in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::{Ready, ready};
use std::str::FromStr;

use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::Serialize;

pub const TOKEN_KEY: &str = "token";
pub const ADMIN_TOKEN_KEY: &str = "adminToken";
pub const ROLE_KEY: &str = "role";
pub const ADMIN_TAB_KEY: &str = "adminActiveTab";

/// Minimal key/value surface needed from a session backend.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl SessionStorage for Session {
    fn get(&self, key: &str) -> Option<String> {
        match Session::get::<String>(self, key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read session key {key}: {e}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.insert(key, value) {
            log::error!("Failed to write session key {key}: {e}");
        }
    }

    fn remove(&self, key: &str) {
        Session::remove(self, key);
    }
}

/// In-memory storage used by tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential currently held by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCredential {
    None,
    User(String),
    Admin(String),
}

impl SessionCredential {
    pub fn role(&self) -> Role {
        match self {
            SessionCredential::None => Role::Anonymous,
            SessionCredential::User(_) => Role::User,
            SessionCredential::Admin(_) => Role::Admin,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionCredential::None => None,
            SessionCredential::User(token) | SessionCredential::Admin(token) => Some(token),
        }
    }
}

/// Admin dashboard tabs; the last one opened is remembered in the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTab {
    #[default]
    Events,
    Past,
    Locations,
    Users,
}

impl AdminTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminTab::Events => "events",
            AdminTab::Past => "past",
            AdminTab::Locations => "locations",
            AdminTab::Users => "users",
        }
    }
}

impl FromStr for AdminTab {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events" => Ok(AdminTab::Events),
            "past" => Ok(AdminTab::Past),
            "locations" => Ok(AdminTab::Locations),
            "users" => Ok(AdminTab::Users),
            _ => Err(()),
        }
    }
}

/// Single writer of the credential keys.
pub struct SessionStore<'a, S: SessionStorage + ?Sized> {
    storage: &'a S,
}

impl<'a, S: SessionStorage + ?Sized> SessionStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &'a S {
        self.storage
    }

    /// Admin token wins over user token; blank tokens count as absent.
    pub fn credential(&self) -> SessionCredential {
        let read = |key: &str| self.storage.get(key).filter(|t| !t.trim().is_empty());

        if let Some(token) = read(ADMIN_TOKEN_KEY) {
            return SessionCredential::Admin(token);
        }
        if let Some(token) = read(TOKEN_KEY) {
            return SessionCredential::User(token);
        }
        SessionCredential::None
    }

    pub fn role(&self) -> Role {
        self.credential().role()
    }

    pub fn bearer(&self) -> Option<String> {
        self.credential().token().map(str::to_string)
    }

    pub fn login_user(&self, token: &str) {
        self.storage.remove(ADMIN_TOKEN_KEY);
        self.storage.remove(ADMIN_TAB_KEY);
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(ROLE_KEY, Role::User.as_str());
    }

    pub fn login_admin(&self, token: &str) {
        self.storage.remove(TOKEN_KEY);
        self.storage.set(ADMIN_TOKEN_KEY, token);
        self.storage.set(ROLE_KEY, Role::Admin.as_str());
    }

    /// Local-only sign out: every credential key is dropped.
    pub fn logout(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(ADMIN_TOKEN_KEY);
        self.storage.remove(ROLE_KEY);
        self.storage.remove(ADMIN_TAB_KEY);
    }

    /// Drops only the admin credential, e.g. after failed verification.
    pub fn clear_admin(&self) {
        self.storage.remove(ADMIN_TOKEN_KEY);
        self.storage.remove(ADMIN_TAB_KEY);
        if self.storage.get(ROLE_KEY).as_deref() == Some(Role::Admin.as_str()) {
            self.storage.remove(ROLE_KEY);
        }
    }

    pub fn admin_tab(&self) -> Option<AdminTab> {
        self.storage
            .get(ADMIN_TAB_KEY)
            .and_then(|tab| tab.parse().ok())
    }

    pub fn remember_admin_tab(&self, tab: AdminTab) {
        self.storage.set(ADMIN_TAB_KEY, tab.as_str());
    }
}

/// Extractor carrying the session and the credential resolved for this request.
pub struct CurrentSession {
    session: Session,
    credential: SessionCredential,
}

impl CurrentSession {
    pub fn new(session: Session) -> Self {
        let credential = SessionStore::new(&session).credential();
        Self {
            session,
            credential,
        }
    }

    pub fn role(&self) -> Role {
        self.credential.role()
    }

    pub fn credential(&self) -> &SessionCredential {
        &self.credential
    }

    pub fn bearer(&self) -> Option<&str> {
        self.credential.token()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> SessionStore<'_, Session> {
        SessionStore::new(&self.session)
    }
}

impl FromRequest for CurrentSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(CurrentSession::new(req.get_session())))
    }
}
