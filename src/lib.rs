//! # Vocabulary Flashcards Telegram Bot
//!
//! A Telegram bot that drills vocabulary cards: it shows a translation,
//! offers multiple-choice answers on a reply keyboard, and tracks each
//! user's learned words in PostgreSQL.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
