use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Deserialize;
use tera::Tera;

use crate::api::EventQuery;
use crate::api::client::ApiClient;
use crate::forms::checkout::{QuantityForm, parse_quantity};
use crate::models::config::ServerConfig;
use crate::routes::{
    backend_for, base_context, page_context, redirect, render_template, toasts_with,
};
use crate::services::checkout::INVALID_QUANTITY;
use crate::services::events::{self as events_service, select_quantity};
use crate::session::{CurrentSession, Role};
use crate::toast::{ToastLevel, notify};

const EVENTS_FAILED: &str = "Failed to fetch events. Please try again.";
const DETAILS_FAILED: &str = "Failed to load event details";
const ADMIN_NO_BOOKING: &str =
    "Admin accounts cannot book tickets. Please logout and login as a regular user to book tickets.";

#[derive(Debug, Deserialize)]
pub struct EventsQueryParams {
    pub q: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsQueryParams {
    pub quantity: Option<String>,
}

#[get("/events")]
pub async fn show_events(
    params: web::Query<EventsQueryParams>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let params = params.into_inner();
    let query = EventQuery::new()
        .search(params.q.unwrap_or_default())
        .location(params.location.unwrap_or_default());
    let backend = backend_for(&api, &session);

    match events_service::load_events(&backend, query.clone()).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &session, "events", &server_config);
            context.insert("events", &data.events);
            context.insert("locations", &data.locations);
            context.insert("query", &data.query);
            render_template(&tera, "events/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list events: {err}");
            let toasts = toasts_with(
                &flash_messages,
                ToastLevel::Error,
                err.user_message(EVENTS_FAILED),
            );
            let mut context = page_context(toasts, &session, "events", &server_config);
            context.insert("events", &Vec::<()>::new());
            context.insert("locations", &Vec::<String>::new());
            context.insert("query", &query);
            render_template(&tera, "events/index.html", &context)
        }
    }
}

#[get("/events/{event_id}")]
pub async fn show_event(
    event_id: web::Path<String>,
    params: web::Query<DetailsQueryParams>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let backend = backend_for(&api, &session);

    let requested = params.quantity.as_deref().map(parse_quantity);

    match events_service::load_event_details(&backend, &event_id, requested).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &session, "events", &server_config);
            context.insert("event", &data.event);
            context.insert("selection", &data.selection);
            context.insert("total", &data.total);
            context.insert("is_admin", &(session.role() == Role::Admin));
            render_template(&tera, "events/show.html", &context)
        }
        Err(err) if err.is_not_found() => {
            notify(
                session.session(),
                ToastLevel::Error,
                err.user_message(DETAILS_FAILED),
            );
            redirect("/events")
        }
        Err(err) => {
            log::error!("Failed to load event {event_id}: {err}");
            notify(
                session.session(),
                ToastLevel::Error,
                err.user_message(DETAILS_FAILED),
            );
            redirect("/events")
        }
    }
}

/// "Book now" on the details page: validates the quantity and moves on to
/// checkout with it.
#[post("/events/{event_id}/checkout")]
pub async fn start_checkout(
    event_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    web::Form(form): web::Form<QuantityForm>,
) -> impl Responder {
    let event_id = event_id.into_inner();
    let details_url = format!("/events/{event_id}");

    if session.role() == Role::Admin {
        notify(session.session(), ToastLevel::Error, ADMIN_NO_BOOKING);
        return redirect(&details_url);
    }

    let backend = backend_for(&api, &session);
    let event = match events_service::load_event_details(&backend, &event_id, None).await {
        Ok(data) => data.event,
        Err(err) => {
            log::error!("Failed to load event {event_id} before checkout: {err}");
            notify(
                session.session(),
                ToastLevel::Error,
                err.user_message(DETAILS_FAILED),
            );
            return redirect("/events");
        }
    };

    let selection = select_quantity(form.quantity, event.available_seats);
    if selection.error.is_some() {
        // The details page re-clamps the submitted quantity and shows why inline.
        return redirect(&format!("{details_url}?quantity={}", form.quantity));
    }
    if !selection.is_bookable(event.available_seats) {
        notify(session.session(), ToastLevel::Error, INVALID_QUANTITY);
        return redirect(&details_url);
    }

    redirect(&format!("/checkout/{event_id}?quantity={}", selection.quantity))
}
