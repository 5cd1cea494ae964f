//! Actix handlers and the rendering helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::Utc;
use tera::{Context, Tera};

use crate::api::client::ApiClient;
use crate::api::http::HttpBackend;
use crate::models::config::ServerConfig;
use crate::services::admin::AdminWorkspaces;
use crate::services::auth::SESSION_EXPIRED;
use crate::session::{CurrentSession, SessionCredential};
use crate::toast::{ToastCenter, ToastLevel, notify};

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod events;
pub mod main;

pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_REQUIRED: &str = "Login as admin first!";

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Failed to render template '{template}': {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Context shared by every page: toasts, the resolved role and navigation.
pub fn page_context(
    toasts: ToastCenter,
    session: &CurrentSession,
    current_page: &str,
    server_config: &ServerConfig,
) -> Context {
    let mut context = Context::new();
    context.insert("toasts", &toasts.into_toasts());
    context.insert("role", session.role().as_str());
    context.insert("current_page", current_page);
    context.insert("admin_home", &server_config.admin_home);
    context
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    session: &CurrentSession,
    current_page: &str,
    server_config: &ServerConfig,
) -> Context {
    page_context(
        ToastCenter::from_flash(flash_messages, Utc::now()),
        session,
        current_page,
        server_config,
    )
}

/// Toasts from the previous request plus one raised while rendering this one.
pub fn toasts_with(
    flash_messages: &IncomingFlashMessages,
    level: ToastLevel,
    message: impl Into<String>,
) -> ToastCenter {
    let now = Utc::now();
    let mut toasts = ToastCenter::from_flash(flash_messages, now);
    toasts.push(message, level, None, now);
    toasts
}

/// Backend handle authorized with whatever credential the session holds.
pub fn backend_for(client: &ApiClient, session: &CurrentSession) -> HttpBackend {
    HttpBackend::new(client.clone().with_auth_token(session.bearer()))
}

/// Admin token of the session, or a redirect to the admin login page.
pub fn require_admin(session: &CurrentSession) -> Result<String, HttpResponse> {
    match session.credential() {
        SessionCredential::Admin(token) => Ok(token.clone()),
        _ => {
            notify(session.session(), ToastLevel::Error, ADMIN_REQUIRED);
            Err(redirect(ADMIN_LOGIN_PATH))
        }
    }
}

/// Drops a rejected admin credential and sends the admin back to log in.
pub fn expire_admin_session(
    session: &CurrentSession,
    workspaces: &AdminWorkspaces,
    token: &str,
) -> HttpResponse {
    workspaces.close(token);
    session.store().clear_admin();
    notify(session.session(), ToastLevel::Error, SESSION_EXPIRED);
    redirect(ADMIN_LOGIN_PATH)
}
