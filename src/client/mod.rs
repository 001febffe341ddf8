//! Client side of the application: the chat and image generator state machines,
//! the per-identity store they persist into, and the HTTP transport to the relays.

pub mod chat;
pub mod history;
pub mod image;
pub mod relay;
pub mod scope;
pub mod store;
pub mod utf8;
