pub mod chat_message;
pub mod data_uri;
pub mod generation;
pub mod identity;
