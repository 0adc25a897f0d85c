//! Backend for the AI web app - forwards prompts to OpenAI for text and image
//! generation and keeps the 50 most recent results of each kind.
//!
//! The recent results live in bounded, newest-first history logs on a shared
//! list store (Redis in production), so every request handler sees the same
//! history.

pub mod ai;
pub mod app;
pub mod error;
pub mod history;
pub mod models;
pub mod server;
pub mod store;

pub use error::{Error, Result};
