pub mod chat_service;
pub mod image_service;
pub mod llm_service;
pub mod sse;
