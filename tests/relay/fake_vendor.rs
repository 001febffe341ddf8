//! Local stand-ins for the chat and image vendors, speaking just enough of
//! their wire formats for the relays.

use actix_web::{post, web, App, HttpRequest, HttpResponse, HttpServer};
use async_stream::stream;
use bytes::Bytes;
use serde_json::{json, Value};

fn delta(content: &str) -> Bytes {
    Bytes::from(format!(
        "data: {}\n\n",
        json!({"choices": [{"delta": {"content": content}}]})
    ))
}

#[post("/chat/completions")]
async fn chat_completions(body: web::Json<Value>) -> HttpResponse {
    let last = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();

    if last == "unauthorized" {
        return HttpResponse::Unauthorized().json(json!({"error": {"message": "Invalid API Key"}}));
    }

    let events = stream! {
        if last == "break" {
            yield Ok::<Bytes, actix_web::Error>(delta("one "));
            yield Ok(delta("two "));
            yield Ok(Bytes::from(r#"data: {"error":{"message":"upstream overloaded"}}"#.to_string() + "\n\n"));
            return;
        }
        yield Ok(delta("Hel"));
        yield Ok(delta("lo!"));
        yield Ok(delta(" é"));
        yield Ok(Bytes::from_static(b"data: [DONE]\n\n"));
    };
    HttpResponse::Ok().content_type("text/event-stream").streaming(events)
}

#[post("/stability")]
async fn stability(body: web::Bytes) -> HttpResponse {
    let form = String::from_utf8_lossy(&body);
    if form.contains("slow down") {
        return HttpResponse::TooManyRequests()
            .json(json!({"name": "rate_limit_exceeded", "errors": ["You have exceeded the rate limit"]}));
    }
    if form.contains("filtered") {
        return HttpResponse::Ok().json(json!({"finish_reason": "CONTENT_FILTERED"}));
    }
    assert!(form.contains("sd3.5-large-turbo"));
    HttpResponse::Ok().json(json!({"image": "iVBORw0KGgo=", "finish_reason": "SUCCESS"}))
}

/// Raw image bytes back, like the Hugging Face inference API.
#[post("/huggingface")]
async fn huggingface(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    assert_eq!(
        req.headers().get("authorization").and_then(|v| v.to_str().ok()),
        Some("Bearer hf-key")
    );
    match body["inputs"].as_str() {
        Some("busy") => HttpResponse::ServiceUnavailable().body("Model is currently loading"),
        Some("empty") => HttpResponse::Ok().content_type("image/png").finish(),
        Some(_) => HttpResponse::Ok()
            .content_type("image/png")
            .body(&b"\x89PNG\r\n\x1a\n"[..]),
        None => HttpResponse::BadRequest().body("inputs must be a string"),
    }
}

/// Starts the fake vendor and returns its base URL.
pub fn start() -> String {
    let server = HttpServer::new(|| App::new().service(chat_completions).service(stability).service(huggingface))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake vendor");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}
