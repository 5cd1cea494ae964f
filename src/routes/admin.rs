use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::Utc;
use serde::Deserialize;
use tera::Tera;

use crate::api::client::ApiClient;
use crate::api::http::HttpBackend;
use crate::domain::types::{EventId, LocationId, UserId};
use crate::forms::event::EventForm;
use crate::forms::location::LocationForm;
use crate::models::config::ServerConfig;
use crate::routes::{
    backend_for, expire_admin_session, page_context, redirect, render_template, require_admin,
};
use crate::services::ServiceError;
use crate::services::admin::{
    AdminWorkspace, AdminWorkspaces, EVENT_DELETE_FAILED, EVENT_DELETED, EVENT_SAVE_FAILED,
    LOCATION_ADD_FAILED, LOCATION_ADDED, LOCATION_DELETE_FAILED, LOCATION_DELETED,
    ROSTER_FETCH_FAILED, USER_BOOKINGS_FAILED, mount_failure,
};
use crate::session::{AdminTab, CurrentSession};
use crate::toast::{ToastCenter, ToastLevel, notify};

const EVENT_NOT_FOUND: &str = "Event not found";
const LOCATION_NOT_FOUND: &str = "Location not found";

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub tab: Option<String>,
    pub refresh: Option<String>,
}

impl DashboardParams {
    fn refresh(&self) -> bool {
        matches!(self.refresh.as_deref(), Some("1" | "true"))
    }
}

/// One admin request: the credential, a checked-out workspace and a backend
/// handle carrying the admin token.
struct AdminRequest {
    token: String,
    workspace: AdminWorkspace,
    backend: HttpBackend,
}

impl AdminRequest {
    fn begin(
        session: &CurrentSession,
        api: &ApiClient,
        workspaces: &AdminWorkspaces,
    ) -> Result<Self, HttpResponse> {
        let token = require_admin(session)?;
        Ok(Self {
            workspace: workspaces.checkout(&token),
            backend: backend_for(api, session),
            token,
        })
    }

    fn finish(self, workspaces: &AdminWorkspaces, response: HttpResponse) -> HttpResponse {
        workspaces.commit(&self.token, self.workspace);
        response
    }
}

fn tab_url(server_config: &ServerConfig, tab: AdminTab) -> String {
    format!("{}?tab={}", server_config.admin_home, tab.as_str())
}

/// Toast and redirect for a failed admin action. A rejected token ends the
/// admin session instead.
fn failure(
    session: &CurrentSession,
    workspaces: &AdminWorkspaces,
    token: &str,
    err: ServiceError,
    fallback: &str,
    back: &str,
) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => expire_admin_session(session, workspaces, token),
        err => {
            log::error!("{fallback}: {err}");
            notify(session.session(), ToastLevel::Error, err.user_message(fallback));
            redirect(back)
        }
    }
}

fn parse_event_id(raw: String) -> Result<EventId, ServiceError> {
    EventId::new(raw).map_err(|_| ServiceError::NotFound)
}

fn parse_location_id(raw: String) -> Result<LocationId, ServiceError> {
    LocationId::new(raw).map_err(|_| ServiceError::NotFound)
}

pub async fn show_dashboard(
    params: web::Query<DashboardParams>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let store = session.store();
    let tab = params
        .tab
        .as_deref()
        .and_then(|tab| tab.parse::<AdminTab>().ok())
        .or_else(|| store.admin_tab())
        .unwrap_or_default();
    store.remember_admin_tab(tab);

    let now = Utc::now();
    let mut toasts = ToastCenter::from_flash(&flash_messages, now);
    match request
        .workspace
        .open_tab(&request.backend, tab, params.refresh(), now)
        .await
    {
        Ok(()) => {}
        Err(ServiceError::Unauthorized) => {
            return expire_admin_session(&session, &workspaces, &request.token);
        }
        Err(err) => {
            log::error!("Failed to mount the {} tab: {err}", tab.as_str());
            toasts.push(mount_failure(tab), ToastLevel::Error, None, now);
        }
    }

    let data = request.workspace.dashboard(tab, now);
    let mut context = page_context(toasts, &session, "admin", &server_config);
    context.insert("dashboard", &data);
    let response = render_template(&tera, "admin/dashboard.html", &context);
    request.finish(&workspaces, response)
}

#[post("/admin/events")]
pub async fn save_event(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<EventForm>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Events);

    let response = match request.workspace.events.save(&request.backend, form).await {
        Ok(message) => {
            notify(session.session(), ToastLevel::Success, message);
            redirect(&back)
        }
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            EVENT_SAVE_FAILED,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[get("/admin/events/{event_id}/edit")]
pub async fn edit_event(
    event_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Events);

    let started = parse_event_id(event_id.into_inner())
        .and_then(|id| request.workspace.events.start_edit(&id));
    let response = match started {
        Ok(()) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            EVENT_NOT_FOUND,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/events/cancel-edit")]
pub async fn cancel_edit(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    request.workspace.events.cancel_edit();
    let response = redirect(&tab_url(&server_config, AdminTab::Events));
    request.finish(&workspaces, response)
}

#[post("/admin/events/{event_id}/delete")]
pub async fn request_event_delete(
    event_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Events);

    let requested = parse_event_id(event_id.into_inner())
        .and_then(|id| request.workspace.events.request_delete(&id));
    let response = match requested {
        Ok(()) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            EVENT_NOT_FOUND,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/events/{event_id}/delete/confirm")]
pub async fn confirm_event_delete(
    event_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Events);

    let deleted = match parse_event_id(event_id.into_inner()) {
        Ok(id) => {
            request
                .workspace
                .events
                .confirm_delete(&request.backend, &id)
                .await
        }
        Err(err) => Err(err),
    };
    let response = match deleted {
        Ok(true) => {
            notify(session.session(), ToastLevel::Success, EVENT_DELETED);
            redirect(&back)
        }
        Ok(false) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            EVENT_DELETE_FAILED,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/events/delete/cancel")]
pub async fn cancel_event_delete(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    request.workspace.events.cancel_delete();
    let response = redirect(&tab_url(&server_config, AdminTab::Events));
    request.finish(&workspaces, response)
}

#[get("/admin/past/{event_id}/toggle")]
pub async fn toggle_roster(
    event_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Past);

    let toggled = match parse_event_id(event_id.into_inner()) {
        Ok(id) => {
            request
                .workspace
                .events
                .toggle_roster(&request.backend, id)
                .await
        }
        Err(err) => Err(err),
    };
    let response = match toggled {
        Ok(()) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            ROSTER_FETCH_FAILED,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/locations")]
pub async fn add_location(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LocationForm>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Locations);

    let response = match request.workspace.locations.add(&request.backend, form).await {
        Ok(location) => {
            request.workspace.events.note_location(&location.display_name);
            notify(session.session(), ToastLevel::Success, LOCATION_ADDED);
            redirect(&back)
        }
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            LOCATION_ADD_FAILED,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/locations/{location_id}/delete")]
pub async fn request_location_delete(
    location_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Locations);

    let requested = parse_location_id(location_id.into_inner())
        .and_then(|id| request.workspace.locations.request_delete(&id));
    let response = match requested {
        Ok(()) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            LOCATION_NOT_FOUND,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/locations/{location_id}/delete/confirm")]
pub async fn confirm_location_delete(
    location_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Locations);

    let deleted = match parse_location_id(location_id.into_inner()) {
        Ok(id) => {
            request
                .workspace
                .locations
                .confirm_delete(&request.backend, &id)
                .await
        }
        Err(err) => Err(err),
    };
    let response = match deleted {
        Ok(Some(location)) => {
            request
                .workspace
                .events
                .forget_location(&location.display_name);
            notify(session.session(), ToastLevel::Success, LOCATION_DELETED);
            redirect(&back)
        }
        Ok(None) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            LOCATION_DELETE_FAILED,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}

#[post("/admin/locations/delete/cancel")]
pub async fn cancel_location_delete(
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    request.workspace.locations.cancel_delete();
    let response = redirect(&tab_url(&server_config, AdminTab::Locations));
    request.finish(&workspaces, response)
}

#[get("/admin/users/{user_id}/bookings")]
pub async fn user_bookings(
    user_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    workspaces: web::Data<AdminWorkspaces>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut request = match AdminRequest::begin(&session, &api, &workspaces) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let back = tab_url(&server_config, AdminTab::Users);

    let viewed = match UserId::new(user_id.into_inner()) {
        Ok(id) => {
            request
                .workspace
                .users
                .view_bookings(&request.backend, id)
                .await
        }
        Err(_) => Err(ServiceError::NotFound),
    };
    let response = match viewed {
        Ok(()) => redirect(&back),
        Err(err) => failure(
            &session,
            &workspaces,
            &request.token,
            err,
            USER_BOOKINGS_FAILED,
            &back,
        ),
    };
    request.finish(&workspaces, response)
}
