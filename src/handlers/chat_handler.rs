use actix_web::{web, HttpResponse};
use log::{info, warn};

use crate::error::RelayError;
use crate::routes::app_state::AppState;
use crate::services::chat_service;

/// Relays a conversation to the chat vendor and streams the reply back as plain text.
///
/// Failures before the vendor stream opens come back as a JSON error envelope. Once
/// bytes are flowing a vendor failure aborts the response instead, so the client sees
/// a broken stream rather than a truncated but apparently complete message.
pub async fn handle_chat_request(
    data: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, RelayError> {
    let history = chat_service::parse_history(&body).map_err(|e| {
        warn!("Rejected chat request: {}", e);
        e
    })?;
    info!("Processing chat request with {} messages", history.len());

    let relay = chat_service::open_relay(data.chat_vendor.as_ref(), &history).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(relay))
}
