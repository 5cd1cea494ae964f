use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::models::config::ServerConfig;
use crate::routes::{base_context, redirect, render_template};
use crate::session::CurrentSession;

#[get("/")]
pub async fn show_index(
    session: CurrentSession,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, &session, "home", &server_config);
    render_template(&tera, "index.html", &context)
}

/// Legacy dashboard path; the dashboard itself is served at `admin_home`.
#[get("/admin/dashboard")]
pub async fn admin_dashboard_alias(server_config: web::Data<ServerConfig>) -> impl Responder {
    redirect(&server_config.admin_home)
}
