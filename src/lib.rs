pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;
pub mod services;
