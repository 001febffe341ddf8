pub mod app_state;
pub mod chat_routes;
pub mod image_routes;
pub mod oauth_routes;
pub mod page_routes;

use actix_web::web;

/// Mounts every route of the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(page_routes::init_routes)
        .configure(oauth_routes::init_routes)
        .configure(chat_routes::init_routes)
        .configure(image_routes::init_routes);
}
