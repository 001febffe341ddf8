use actix_web::{web, HttpResponse};

use crate::config::IMAGE_BODY_LIMIT;
use crate::error::RelayError;
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/generate-image")
            .app_data(web::PayloadConfig::new(IMAGE_BODY_LIMIT))
            .route(web::post().to(generate_image)),
    );
}

async fn generate_image(
    data: web::Data<AppState>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, RelayError> {
    let body = body.map_err(RelayError::rejected_body)?;
    crate::handlers::image_handler::handle_generate_image(data, body).await
}
