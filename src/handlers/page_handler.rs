use actix_session::Session;
use actix_web::http::header;
use actix_web::HttpResponse;

use crate::handlers::session_handler;
use crate::pages::{self, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Chatbot,
    ImageGenerator,
}

/// Renders `page` for whoever holds `session`.
pub fn render(page: Page, session: &Session, sign_in_enabled: bool) -> HttpResponse {
    let identity = session_handler::current_identity(session);
    let viewer = Viewer::new(identity.as_ref(), sign_in_enabled);
    let html = match page {
        Page::Home => pages::home(&viewer),
        Page::About => pages::about(&viewer),
        Page::Chatbot => pages::chatbot(&viewer),
        Page::ImageGenerator => pages::image_generator(&viewer),
    };
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        // Pages embed the identity scope.
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body(html)
}
