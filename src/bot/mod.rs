//! Bot module for handling Telegram interactions
//!
//! This module is split into two submodules:
//! - `message_handler`: dispatches incoming messages across the card,
//!   quiz, add-word and delete-word flows
//! - `ui_builder`: creates reply keyboards and formats messages

pub mod message_handler;
pub mod ui_builder;

// Re-export the main handler function for use in main.rs
pub use message_handler::message_handler;
