//! Forge Telegram Bot
//!
//! Fronts an agent with a Telegram bot driven by long polling.

pub mod api;
pub mod bot;
pub mod config;

pub use bot::TelegramBot;
pub use config::TelegramConfig;
