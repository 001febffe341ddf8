use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde_json::{json, Value};

use crate::error::RelayError;
use crate::routes::app_state::AppState;

pub const PROMPT_REQUIRED: &str = "Prompt is required and must be a string.";

/// Extracts a non-empty string `prompt` from the request body.
pub fn parse_prompt(body: &[u8]) -> Result<String, RelayError> {
    let json: Value = serde_json::from_slice(body).map_err(|_| RelayError::validation(PROMPT_REQUIRED))?;
    match json.get("prompt") {
        Some(Value::String(prompt)) if !prompt.is_empty() => Ok(prompt.clone()),
        _ => Err(RelayError::validation(PROMPT_REQUIRED)),
    }
}

/// Forwards a prompt to the configured image vendor and answers `{ "image": <data URI> }`.
pub async fn handle_generate_image(
    data: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, RelayError> {
    let prompt = parse_prompt(&body).map_err(|e| {
        warn!("Rejected image request: {}", e);
        e
    })?;

    info!("Generating image for a {} character prompt", prompt.len());
    let image = data.image_vendor.generate(&prompt).await.map_err(|e| {
        error!("Image generation failed: {:?}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(json!({ "image": image.data_uri })))
}
