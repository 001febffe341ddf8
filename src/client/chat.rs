use futures::StreamExt;
use log::{debug, error, info};

use crate::client::relay::{ChatTransport, ClientError};
use crate::client::scope::{ScopedStore, CHAT_HISTORY_KEY};
use crate::client::store::KeyValueStore;
use crate::config::{APOLOGY, GREETING};
use crate::models::chat_message::{ChatMessage, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Sending,
    Streaming,
    /// Idle, with the last exchange replaced by the apology.
    Error,
}

/// How a call to [`ChatSession::send`] ended.
#[derive(Debug)]
pub enum SendOutcome {
    /// Nothing was sent: the input was blank or a reply was already in flight.
    Ignored,
    Completed,
    Failed(ClientError),
}

/// One identity's conversation. The session is the only writer of the
/// in-progress assistant turn; each step of an exchange is written through to the store.
pub struct ChatSession<S> {
    store: ScopedStore<S>,
    messages: Vec<ChatMessage>,
    state: ChatState,
}

impl<S: KeyValueStore> ChatSession<S> {
    /// Restores the persisted conversation, or starts one with the greeting.
    /// A reply left empty by an interrupted run is restored as the apology.
    pub fn open(store: ScopedStore<S>) -> Self {
        let mut messages = store
            .load::<Vec<ChatMessage>>(CHAT_HISTORY_KEY)
            .filter(|messages| !messages.is_empty())
            .unwrap_or_else(|| vec![ChatMessage::assistant(GREETING)]);
        if let Some(last) = messages
            .last_mut()
            .filter(|m| m.role == Role::Assistant && m.content.trim().is_empty())
        {
            last.content = APOLOGY.to_string();
        }
        ChatSession {
            store,
            messages,
            state: ChatState::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, ChatState::Sending | ChatState::Streaming)
    }

    pub fn clear(&mut self) {
        self.store.forget(CHAT_HISTORY_KEY);
        self.messages = vec![ChatMessage::assistant(GREETING)];
        self.state = ChatState::Idle;
        info!("Cleared chat for {}", self.store.scope());
    }

    /// Appends the user turn and an empty assistant placeholder, returning the
    /// history to send. `None` when the input is blank or a reply is in flight.
    pub fn begin(&mut self, input: &str) -> Option<Vec<ChatMessage>> {
        let input = input.trim();
        if input.is_empty() || self.is_busy() {
            return None;
        }

        self.messages.push(ChatMessage::user(input));
        let outgoing = self.messages.clone();
        self.messages.push(ChatMessage::assistant(""));
        self.state = ChatState::Sending;
        self.save();
        Some(outgoing)
    }

    /// Appends streamed text to the placeholder.
    pub fn append_fragment(&mut self, fragment: &str) {
        if !self.is_busy() {
            return;
        }
        self.state = ChatState::Streaming;
        if let Some(last) = self.messages.last_mut().filter(|m| m.role == Role::Assistant) {
            last.content.push_str(fragment);
        }
    }

    /// Discards any partial reply in favour of the apology.
    pub fn fail(&mut self) {
        match self.messages.last_mut().filter(|m| m.role == Role::Assistant) {
            Some(last) => last.content = APOLOGY.to_string(),
            None => self.messages.push(ChatMessage::assistant(APOLOGY)),
        }
        self.state = ChatState::Error;
        self.save();
    }

    pub fn finish(&mut self) {
        self.state = ChatState::Idle;
        self.save();
    }

    /// Runs one full exchange, calling `on_fragment` with each piece of text as it lands.
    pub async fn send<T, F>(&mut self, transport: &T, input: &str, mut on_fragment: F) -> SendOutcome
    where
        T: ChatTransport + ?Sized,
        F: FnMut(&str),
    {
        let outgoing = match self.begin(input) {
            Some(outgoing) => outgoing,
            None => return SendOutcome::Ignored,
        };
        debug!("Sending {} messages to the chat relay", outgoing.len());

        let mut fragments = match transport.open_chat(&outgoing).await {
            Ok(fragments) => fragments,
            Err(e) => {
                error!("Error sending message: {}", e);
                self.fail();
                return SendOutcome::Failed(e);
            }
        };

        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(text) => {
                    self.append_fragment(&text);
                    on_fragment(&text);
                }
                Err(e) => {
                    error!("Chat stream failed: {}", e);
                    self.fail();
                    return SendOutcome::Failed(e);
                }
            }
        }

        self.finish();
        SendOutcome::Completed
    }

    /// Writes the history. While a reply is in flight its turn is stored as
    /// the apology, so an interrupted run never restores half a reply.
    fn save(&self) {
        if self.is_busy() {
            let mut stored = self.messages.clone();
            if let Some(last) = stored.last_mut().filter(|m| m.role == Role::Assistant) {
                last.content = APOLOGY.to_string();
            }
            self.store.persist(CHAT_HISTORY_KEY, &stored);
        } else {
            self.store.persist(CHAT_HISTORY_KEY, &self.messages);
        }
    }
}
