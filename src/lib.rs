pub mod auth;
pub mod booking;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod notify;
pub mod state;
pub mod types;
pub mod webhook;
