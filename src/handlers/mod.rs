pub mod chat_handler;
pub mod image_handler;
pub mod oauth_handler;
pub mod page_handler;
pub mod session_handler;
