use async_stream::stream;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use log::{error, info};
use uuid::Uuid;

use crate::error::RelayError;
use crate::models::chat_message::ChatMessage;
use crate::services::llm_service::{build_conversation, ChatVendor, DeltaStream};

/// Lifecycle of one relayed completion. There is no way back from `Closed` or `Errored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Open,
    Closed,
    Errored,
}

/// Parses the request body: an ordered JSON array of `{role, content}` turns.
pub fn parse_history(body: &[u8]) -> Result<Vec<ChatMessage>, RelayError> {
    serde_json::from_slice::<Vec<ChatMessage>>(body).map_err(|e| {
        RelayError::validation(format!(
            "Body must be a JSON array of {{role, content}} messages: {}",
            e
        ))
    })
}

/// Opens the vendor stream for `history` and returns the bytes to forward.
pub async fn open_relay(
    vendor: &dyn ChatVendor,
    history: &[ChatMessage],
) -> Result<impl Stream<Item = Result<Bytes, RelayError>> + 'static, RelayError> {
    let relay_id = Uuid::new_v4();
    info!("Relay {} opening with {} messages", relay_id, history.len());
    let deltas = vendor.stream_chat(build_conversation(history)).await.map_err(|e| {
        error!("Relay {} could not open vendor stream: {}", relay_id, e);
        e
    })?;
    Ok(forward(relay_id, deltas))
}

/// Forwards each delta as soon as it arrives, in vendor order. The first vendor
/// error is passed through and ends the stream; nothing is appended after it.
pub fn forward(relay_id: Uuid, mut deltas: DeltaStream) -> impl Stream<Item = Result<Bytes, RelayError>> + 'static {
    stream! {
        let mut state = RelayState::Open;
        let mut chunks = 0usize;
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(text) => {
                    chunks += 1;
                    yield Ok(Bytes::from(text));
                }
                Err(e) => {
                    state = RelayState::Errored;
                    error!("Relay {} errored after {} chunks: {}", relay_id, chunks, e);
                    yield Err(e);
                    break;
                }
            }
        }
        if state == RelayState::Open {
            state = RelayState::Closed;
        }
        info!("Relay {} finished in state {:?} after {} chunks", relay_id, state, chunks);
    }
}
