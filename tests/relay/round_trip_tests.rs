//! Browser-equivalent client -> relay server -> fake vendor, over real sockets.

use std::collections::HashMap;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{web, App, HttpServer};
use futures::StreamExt;

use hashbot::client::chat::{ChatSession, ChatState, SendOutcome};
use hashbot::client::image::{ImageStudio, StudioState};
use hashbot::client::relay::{ChatTransport, ClientError, ImageTransport, RelayClient};
use hashbot::client::scope::{IdentityScope, ScopedStore};
use hashbot::client::store::MemoryStore;
use hashbot::config::{Config, APOLOGY, RATE_LIMIT_MESSAGE};
use hashbot::models::chat_message::ChatMessage;
use hashbot::routes::{self, app_state::AppState};

use crate::fake_vendor;

fn start_relay() -> RelayClient {
    start_relay_with(&[])
}

/// Starts the relay against the fake vendor; `extra` overrides or adds settings.
fn start_relay_with(extra: &[(&'static str, &str)]) -> RelayClient {
    let _ = env_logger::builder().is_test(true).try_init();
    let vendor = fake_vendor::start();
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("GROQ_BASE_URL", vendor.clone()),
        ("GROQ_API_KEY", "test-key".to_string()),
        ("STABILITY_URL", format!("{}/stability", vendor)),
        ("STABILITY_API_KEY", "test-key".to_string()),
        ("HUGGINGFACE_URL", format!("{}/huggingface", vendor)),
        ("HUGGINGFACE_API_KEY", "hf-key".to_string()),
    ]);
    vars.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = web::Data::new(AppState::from_config(&config));
    let key = Key::generate();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), key.clone()))
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    RelayClient::new(&format!("http://{}", addr)).unwrap()
}

fn anonymous() -> ScopedStore<MemoryStore> {
    ScopedStore::new(MemoryStore::new(), IdentityScope::Anonymous)
}

#[actix_web::test]
async fn streamed_reply_arrives_in_order() {
    let relay = start_relay();
    let mut chat = ChatSession::open(anonymous());

    let mut fragments = Vec::new();
    let outcome = chat.send(&relay, "hi", |f| fragments.push(f.to_string())).await;

    assert!(matches!(outcome, SendOutcome::Completed));
    assert_eq!(fragments.concat(), "Hello! é");
    assert_eq!(chat.messages().last(), Some(&ChatMessage::assistant("Hello! é")));
    assert_eq!(chat.state(), ChatState::Idle);
}

#[actix_web::test]
async fn vendor_failure_mid_stream_breaks_the_response() {
    let relay = start_relay();
    let mut stream = relay.open_chat(&[ChatMessage::user("break")]).await.unwrap();

    let mut text = String::new();
    let mut failed = false;
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => text.push_str(&fragment),
            Err(_) => {
                failed = true;
                break;
            }
        }
    }
    assert!(failed, "stream should end abnormally");
    assert_eq!(text, "one two ");

    let mut chat = ChatSession::open(anonymous());
    assert!(matches!(chat.send(&relay, "break", |_| {}).await, SendOutcome::Failed(_)));
    assert_eq!(chat.messages().last(), Some(&ChatMessage::assistant(APOLOGY)));
}

#[actix_web::test]
async fn vendor_rejection_is_forwarded_before_streaming() {
    let relay = start_relay();
    match relay.open_chat(&[ChatMessage::user("unauthorized")]).await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status, 401),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected the relay to refuse"),
    }
}

#[actix_web::test]
async fn image_round_trip_and_rate_limit() {
    let relay = start_relay();
    assert_eq!(
        relay.generate_image("a red balloon").await.unwrap(),
        "data:image/png;base64,iVBORw0KGgo="
    );

    let mut studio = ImageStudio::open(anonymous());
    studio.set_prompt("please slow down");
    studio.generate(&relay).await;
    assert_eq!(studio.state(), StudioState::Error);
    assert_eq!(studio.error(), Some(RATE_LIMIT_MESSAGE));
    assert!(studio.recent().is_empty());
}

#[actix_web::test]
async fn vendor_success_without_image_is_a_server_error() {
    let relay = start_relay();
    match relay.generate_image("filtered").await {
        Err(ClientError::Status { status, error, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(error, "Image provider returned no image");
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}

#[actix_web::test]
async fn huggingface_bytes_become_a_data_uri() {
    let relay = start_relay_with(&[("HASHBOT_IMAGE_PROVIDER", "huggingface")]);
    assert_eq!(
        relay.generate_image("a red balloon").await.unwrap(),
        "data:image/png;base64,iVBORw0KGgo="
    );
}

#[actix_web::test]
async fn huggingface_failures_keep_their_status() {
    let relay = start_relay_with(&[("HASHBOT_IMAGE_PROVIDER", "huggingface")]);

    match relay.generate_image("busy").await {
        Err(ClientError::Status { status, error, details }) => {
            assert_eq!(status, 503);
            assert_eq!(error, "Hugging Face API error");
            assert_eq!(details.as_deref(), Some("Model is currently loading"));
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }

    match relay.generate_image("empty").await {
        Err(ClientError::Status { status, error, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(error, "Image provider returned no image");
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}
