//! Bot module for handling Telegram interactions
//!
//! This module is the thin adapter between Telegram and the dialogue engine:
//! - `message_handler`: maps commands, photos and free text to engine events
//! - `callback_handler`: maps inline keyboard presses to engine events
//! - `ui_builder`: renders engine actions into message text and keyboards

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;
