use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use crate::api::client::ApiClient;
use crate::models::config::ServerConfig;
use crate::routes::admin::{
    add_location, cancel_edit, cancel_event_delete, cancel_location_delete, confirm_event_delete,
    confirm_location_delete, edit_event, request_event_delete, request_location_delete,
    save_event, show_dashboard, toggle_roster, user_bookings,
};
use crate::routes::auth::{admin_login, login, logout, register, show_admin_login, show_auth};
use crate::routes::checkout::{show_checkout, submit_checkout};
use crate::routes::events::{show_event, show_events, start_checkout};
use crate::routes::main::{admin_dashboard_alias, show_index};
use crate::services::admin::AdminWorkspaces;

pub mod api;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod toast;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // One pooled client for the REST backend; handlers attach the session token.
    let api_client = ApiClient::new(&server_config.api_base_url, server_config.request_timeout())
        .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;

    let workspaces = web::Data::new(AdminWorkspaces::new());

    // Keys and stores for sessions and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Serving Eventify on {}:{} against {}",
        bind_address.0,
        bind_address.1,
        server_config.api_base_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::resource(server_config.admin_home.as_str())
                    .route(web::get().to(show_dashboard)),
            )
            .service(show_index)
            .service(show_events)
            .service(show_event)
            .service(start_checkout)
            .service(show_checkout)
            .service(submit_checkout)
            .service(show_auth)
            .service(login)
            .service(register)
            .service(logout)
            .service(show_admin_login)
            .service(admin_login)
            .service(admin_dashboard_alias)
            .service(save_event)
            .service(cancel_edit)
            .service(cancel_event_delete)
            .service(edit_event)
            .service(request_event_delete)
            .service(confirm_event_delete)
            .service(toggle_roster)
            .service(add_location)
            .service(cancel_location_delete)
            .service(request_location_delete)
            .service(confirm_location_delete)
            .service(user_bookings)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(api_client.clone()))
            .app_data(workspaces.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
