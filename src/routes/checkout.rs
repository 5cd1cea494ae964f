use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::Utc;
use serde::Deserialize;
use tera::Tera;

use crate::api::client::ApiClient;
use crate::forms::checkout::{CheckoutForm, parse_quantity};
use crate::models::config::ServerConfig;
use crate::routes::{backend_for, page_context, redirect, render_template};
use crate::services::checkout::{CheckoutFlow, CheckoutState, EVENTS_PATH};
use crate::services::countdown::COUNTDOWN_PERIOD;
use crate::session::CurrentSession;
use crate::toast::{ToastCenter, notify};

#[derive(Debug, Deserialize)]
pub struct CheckoutQueryParams {
    pub quantity: Option<String>,
}

impl CheckoutQueryParams {
    fn requested(&self) -> Option<i64> {
        self.quantity.as_deref().map(parse_quantity)
    }
}

/// Renders whatever state the flow ended in.
fn respond(
    flow: CheckoutFlow,
    mut toasts: ToastCenter,
    session: &CurrentSession,
    server_config: &ServerConfig,
    tera: &Tera,
    form: &CheckoutForm,
    errors: &HashMap<String, String>,
) -> HttpResponse {
    let total = flow.total_amount();
    let adjustment = flow.adjustment().cloned();

    match flow.into_state() {
        CheckoutState::Redirect { to, notice } => {
            notify(session.session(), notice.level, notice.message);
            redirect(&to)
        }
        CheckoutState::Ready { event, quantity } | CheckoutState::Submitting { event, quantity } => {
            if let Some(notice) = adjustment {
                toasts.push(notice.message, notice.level, None, Utc::now());
            }
            let mut context = page_context(toasts, session, "events", server_config);
            context.insert("total", &total);
            context.insert("event", &event);
            context.insert("quantity", &quantity);
            context.insert("form", form);
            context.insert("errors", errors);
            render_template(tera, "checkout/form.html", &context)
        }
        CheckoutState::Success { booking, countdown } => {
            let mut context = page_context(toasts, session, "events", server_config);
            context.insert("total", &total);
            context.insert("booking", &booking);
            context.insert("countdown", &countdown.remaining());
            context.insert("countdown_period_ms", &(COUNTDOWN_PERIOD.as_millis() as u64));
            context.insert("redirect_to", EVENTS_PATH);
            render_template(tera, "checkout/success.html", &context)
        }
        CheckoutState::LoadingEvent { event_id, .. } => {
            log::error!("Checkout for event {event_id} never loaded");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/checkout/{event_id}")]
pub async fn show_checkout(
    event_id: web::Path<String>,
    params: web::Query<CheckoutQueryParams>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let requested = params.requested();
    let mut flow = CheckoutFlow::enter(session.role(), &event_id, requested);
    flow.load(&backend_for(&api, &session)).await;

    let form = CheckoutForm {
        quantity: requested.unwrap_or(1),
        ..CheckoutForm::default()
    };
    respond(
        flow,
        ToastCenter::from_flash(&flash_messages, Utc::now()),
        &session,
        &server_config,
        &tera,
        &form,
        &HashMap::new(),
    )
}

#[post("/checkout/{event_id}")]
pub async fn submit_checkout(
    event_id: web::Path<String>,
    session: CurrentSession,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CheckoutForm>,
) -> impl Responder {
    let backend = backend_for(&api, &session);
    let mut flow = CheckoutFlow::enter(session.role(), &event_id, Some(form.quantity));
    flow.load(&backend).await;

    let report = flow.submit(&backend, session.role(), form.clone()).await;

    let now = Utc::now();
    let mut toasts = ToastCenter::from_flash(&flash_messages, now);
    if let Some(notice) = report.notice {
        toasts.push(notice.message, notice.level, None, now);
    }
    respond(
        flow,
        toasts,
        &session,
        &server_config,
        &tera,
        &form,
        &report.form.visible_errors(),
    )
}
