// ============================================================================
// HTTP API
// ============================================================================
//
// JSON endpoints over `CustomerService`:
//
//   POST   /customers
//   GET    /customers?page=&page_size=&search=
//   GET    /customers/by-phone/{phone}
//   GET    /customers/{id}
//   PUT    /customers/{id}
//   DELETE /customers/{id}
//   POST   /customers/{id}/loyalty-points
//
// ============================================================================

mod error;
mod handlers;
mod merchant;

use error::ApiError;

use actix_web::{dev::Server, web, App, HttpServer};
use std::sync::Arc;

use crate::domain::customer::CustomerService;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/customers")
            .route("", web::post().to(handlers::create_customer))
            .route("", web::get().to(handlers::list_customers))
            .route("/by-phone/{phone}", web::get().to(handlers::find_customer_by_phone))
            .route("/{id}", web::get().to(handlers::get_customer))
            .route("/{id}", web::put().to(handlers::update_customer))
            .route("/{id}", web::delete().to(handlers::delete_customer))
            .route("/{id}/loyalty-points", web::post().to(handlers::add_loyalty_points)),
    );
}

/// Build the API server. The caller drives and stops it.
pub fn http_server(service: Arc<dyn CustomerService>, port: u16) -> std::io::Result<Server> {
    tracing::info!("🌐 Starting customer API on http://0.0.0.0:{}", port);

    let service: web::Data<dyn CustomerService> = web::Data::from(service);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .configure(configure)
    })
    .disable_signals()
    .bind(("0.0.0.0", port))?
    .run();

    Ok(server)
}
