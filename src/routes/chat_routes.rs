use actix_web::{web, HttpResponse};

use crate::config::CHAT_BODY_LIMIT;
use crate::error::RelayError;
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/chat")
            .app_data(web::PayloadConfig::new(CHAT_BODY_LIMIT))
            .route(web::post().to(chat)),
    );
}

async fn chat(
    data: web::Data<AppState>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, RelayError> {
    let body = body.map_err(RelayError::rejected_body)?;
    crate::handlers::chat_handler::handle_chat_request(data, body).await
}
