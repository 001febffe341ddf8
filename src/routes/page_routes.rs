use actix_session::Session;
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::handlers::page_handler::{self, Page};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(home)
        .service(about)
        .service(chatbot)
        .service(image_generator);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "hashbot",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/")]
async fn home(data: web::Data<AppState>, session: Session) -> impl Responder {
    page_handler::render(Page::Home, &session, data.oauth.is_some())
}

#[get("/about")]
async fn about(data: web::Data<AppState>, session: Session) -> impl Responder {
    page_handler::render(Page::About, &session, data.oauth.is_some())
}

#[get("/chatbot")]
async fn chatbot(data: web::Data<AppState>, session: Session) -> impl Responder {
    page_handler::render(Page::Chatbot, &session, data.oauth.is_some())
}

#[get("/image-generator")]
async fn image_generator(data: web::Data<AppState>, session: Session) -> impl Responder {
    page_handler::render(Page::ImageGenerator, &session, data.oauth.is_some())
}
