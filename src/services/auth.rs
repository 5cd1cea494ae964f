//! Sign in, registration and sign out for users and admins.

use crate::api::AuthBackend;
use crate::domain::user::{AccountSummary, Credentials, Registration};
use crate::forms::auth::{AdminLoginForm, LoginForm, RegisterForm};
use crate::services::admin::AdminWorkspaces;
use crate::services::{ServiceError, ServiceResult};
use crate::session::{SessionCredential, SessionStorage, SessionStore};

pub const ADMIN_USE_ADMIN_LOGIN: &str = "Admin cannot login here. Please use Admin Login.";
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const REGISTRATION_SUCCESS: &str = "Registration successful! Please login.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
pub const ADMIN_LOGIN_SUCCESS: &str = "Admin login successful!";
pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// What the admin login page should do with an existing admin token.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminResume {
    /// No admin token: show the login form.
    NoSession,
    /// Token still valid: go straight to the dashboard.
    Verified,
    /// Token rejected; it has been cleared from the session.
    Expired,
}

/// Signs a user in. Admin accounts are turned away from this form.
pub async fn login<R, S>(
    repo: &R,
    store: &SessionStore<'_, S>,
    workspaces: &AdminWorkspaces,
    form: LoginForm,
) -> ServiceResult<()>
where
    R: AuthBackend + ?Sized,
    S: SessionStorage + ?Sized,
{
    let credentials = Credentials::try_from(form)?;
    let response = repo.login(&credentials).await.map_err(ServiceError::Api)?;

    if response.user.as_ref().is_some_and(AccountSummary::is_admin) {
        return Err(ServiceError::Form(ADMIN_USE_ADMIN_LOGIN.to_string()));
    }

    release_admin_workspace(store, workspaces);
    store.login_user(&response.token);
    log::info!("User {} signed in", credentials.email);
    Ok(())
}

pub async fn register<R>(repo: &R, form: RegisterForm) -> ServiceResult<()>
where
    R: AuthBackend + ?Sized,
{
    let registration = Registration::try_from(form)?;
    repo.register(&registration)
        .await
        .map_err(ServiceError::Api)?;
    log::info!("Registered account {}", registration.email);
    Ok(())
}

pub async fn admin_login<R, S>(
    repo: &R,
    store: &SessionStore<'_, S>,
    workspaces: &AdminWorkspaces,
    form: AdminLoginForm,
) -> ServiceResult<()>
where
    R: AuthBackend + ?Sized,
    S: SessionStorage + ?Sized,
{
    let credentials = Credentials::try_from(form)?;
    let response = repo
        .admin_login(&credentials)
        .await
        .map_err(ServiceError::Api)?;

    release_admin_workspace(store, workspaces);
    store.login_admin(&response.token);
    log::info!("Admin {} signed in", credentials.email);
    Ok(())
}

/// Verifies an admin token left in the session. `repo` must carry that token.
pub async fn resume_admin_session<R, S>(repo: &R, store: &SessionStore<'_, S>) -> AdminResume
where
    R: AuthBackend + ?Sized,
    S: SessionStorage + ?Sized,
{
    if !matches!(store.credential(), SessionCredential::Admin(_)) {
        return AdminResume::NoSession;
    }

    match repo.verify_admin().await {
        Ok(()) => AdminResume::Verified,
        Err(e) => {
            log::warn!("Admin token verification failed: {e}");
            store.clear_admin();
            AdminResume::Expired
        }
    }
}

/// Local sign out; the admin workspace, if any, is dropped and its pending
/// calls cancelled.
pub fn logout<S>(store: &SessionStore<'_, S>, workspaces: &AdminWorkspaces)
where
    S: SessionStorage + ?Sized,
{
    release_admin_workspace(store, workspaces);
    store.logout();
}

/// Closes the workspace of the admin token currently held by the session.
fn release_admin_workspace<S>(store: &SessionStore<'_, S>, workspaces: &AdminWorkspaces)
where
    S: SessionStorage + ?Sized,
{
    if let SessionCredential::Admin(token) = store.credential() {
        workspaces.close(&token);
    }
}
