use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, get, post, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Deserialize;
use tera::{Context, Tera};

use crate::api::client::ApiClient;
use crate::forms::FormFields;
use crate::forms::auth::{AdminLoginForm, LoginForm, RegisterForm};
use crate::forms::validation::{PasswordStrength, password_strength};
use crate::models::config::ServerConfig;
use crate::routes::{
    ADMIN_LOGIN_PATH, backend_for, base_context, redirect, render_template,
};
use crate::services::admin::AdminWorkspaces;
use crate::services::auth::{
    self as auth_service, ADMIN_LOGIN_SUCCESS, AdminResume, LOGIN_FAILED, LOGIN_SUCCESS,
    REGISTRATION_FAILED, REGISTRATION_SUCCESS, SESSION_EXPIRED,
};
use crate::services::ServiceError;
use crate::session::{CurrentSession, SessionCredential};
use crate::toast::{ToastLevel, notify};

const LOGIN_TAB: &str = "login";
const REGISTER_TAB: &str = "register";

#[derive(Debug, Deserialize)]
pub struct AuthQueryParams {
    pub tab: Option<String>,
}

/// Submitted values minus the password, for refilling a rejected form.
fn echo_values<F: FormFields>(form: &F) -> HashMap<String, String> {
    let mut values = form.values();
    values.remove("password");
    values
}

fn auth_page(
    mut context: Context,
    tera: &Tera,
    tab: &str,
    values: HashMap<String, String>,
    errors: HashMap<String, String>,
    strength: Option<PasswordStrength>,
) -> HttpResponse {
    context.insert("tab", tab);
    context.insert("values", &values);
    context.insert("errors", &errors);
    context.insert("strength", &strength);
    render_template(tera, "auth/index.html", &context)
}

#[routes]
#[get("/auth")]
#[get("/login")]
pub async fn show_auth(
    params: web::Query<AuthQueryParams>,
    session: CurrentSession,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tab = match params.tab.as_deref() {
        Some(REGISTER_TAB) => REGISTER_TAB,
        _ => LOGIN_TAB,
    };
    let context = base_context(&flash_messages, &session, "auth", &server_config);
    auth_page(context, &tera, tab, HashMap::new(), HashMap::new(), None)
}

#[post("/auth/login")]
pub async fn login(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    workspaces: web::Data<AdminWorkspaces>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let mut state = form.state();
    if !state.validate_all() {
        let context = base_context(&flash_messages, &session, "auth", &server_config);
        return auth_page(
            context,
            &tera,
            LOGIN_TAB,
            echo_values(&form),
            state.visible_errors(),
            None,
        );
    }

    let backend = backend_for(&api, &session);
    match auth_service::login(&backend, &session.store(), &workspaces, form).await {
        Ok(()) => {
            notify(session.session(), ToastLevel::Success, LOGIN_SUCCESS);
            redirect("/events")
        }
        Err(ServiceError::Form(message)) => {
            notify(session.session(), ToastLevel::Error, message);
            redirect("/auth")
        }
        Err(err) => {
            log::error!("User login failed: {err}");
            notify(
                session.session(),
                ToastLevel::Error,
                err.user_message(LOGIN_FAILED),
            );
            redirect("/auth")
        }
    }
}

#[post("/auth/register")]
pub async fn register(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<RegisterForm>,
) -> impl Responder {
    let mut state = form.state();
    if !state.validate_all() {
        let context = base_context(&flash_messages, &session, "auth", &server_config);
        return auth_page(
            context,
            &tera,
            REGISTER_TAB,
            echo_values(&form),
            state.visible_errors(),
            Some(password_strength(&form.password)),
        );
    }

    let backend = backend_for(&api, &session);
    match auth_service::register(&backend, form).await {
        Ok(()) => {
            notify(session.session(), ToastLevel::Success, REGISTRATION_SUCCESS);
            redirect("/auth?tab=login")
        }
        Err(err) => {
            log::error!("Registration failed: {err}");
            notify(
                session.session(),
                ToastLevel::Error,
                err.user_message(REGISTRATION_FAILED),
            );
            redirect("/auth?tab=register")
        }
    }
}

#[get("/admin/login")]
pub async fn show_admin_login(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let token = session.bearer().map(str::to_string);
    let backend = backend_for(&api, &session);

    match auth_service::resume_admin_session(&backend, &session.store()).await {
        AdminResume::Verified => return redirect(&server_config.admin_home),
        AdminResume::Expired => {
            if let Some(token) = token {
                workspaces.close(&token);
            }
            notify(session.session(), ToastLevel::Error, SESSION_EXPIRED);
            return redirect(ADMIN_LOGIN_PATH);
        }
        AdminResume::NoSession => {}
    }

    let mut context = base_context(&flash_messages, &session, "admin", &server_config);
    context.insert("values", &HashMap::<String, String>::new());
    context.insert("errors", &HashMap::<String, String>::new());
    render_template(&tera, "admin/login.html", &context)
}

#[post("/admin/login")]
pub async fn admin_login(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    workspaces: web::Data<AdminWorkspaces>,
    web::Form(form): web::Form<AdminLoginForm>,
) -> impl Responder {
    let mut state = form.state();
    if !state.validate_all() {
        let mut context = base_context(&flash_messages, &session, "admin", &server_config);
        context.insert("values", &echo_values(&form));
        context.insert("errors", &state.visible_errors());
        return render_template(&tera, "admin/login.html", &context);
    }

    let backend = backend_for(&api, &session);
    match auth_service::admin_login(&backend, &session.store(), &workspaces, form).await {
        Ok(()) => {
            notify(session.session(), ToastLevel::Success, ADMIN_LOGIN_SUCCESS);
            redirect(&server_config.admin_home)
        }
        Err(err) => {
            log::error!("Admin login failed: {err}");
            notify(
                session.session(),
                ToastLevel::Error,
                err.user_message(LOGIN_FAILED),
            );
            redirect(ADMIN_LOGIN_PATH)
        }
    }
}

#[post("/logout")]
pub async fn logout(
    session: CurrentSession,
    workspaces: web::Data<AdminWorkspaces>,
) -> impl Responder {
    let was_admin = matches!(session.credential(), SessionCredential::Admin(_));
    auth_service::logout(&session.store(), &workspaces);
    if was_admin {
        redirect(ADMIN_LOGIN_PATH)
    } else {
        redirect("/")
    }
}
