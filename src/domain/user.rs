use serde::{Deserialize, Serialize};

use crate::domain::types::{ContactEmail, MobileNumber, PersonName, UserId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

/// Email/password pair posted to the login endpoints.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Credentials {
    pub email: ContactEmail,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Registration {
    pub name: PersonName,
    pub email: ContactEmail,
    pub password: String,
    pub mobile: MobileNumber,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AccountSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AccountSummary {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Response of `POST /auth/login` and `POST /admin/login`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AccountSummary>,
}
