//! # broadcast-bot
//!
//! Telegram layer of the broadcast bot: env config, the teloxide transport
//! adapter, operator command and callback handlers, and the dispatcher runner.
//! The broadcast core (gate, engine, scheduler) lives in the `dispatch` crate.

mod cli;
mod config;
mod handlers;
mod parse;
mod runner;
mod telegram;

pub use cli::{Cli, Commands};
pub use config::BotConfig;
pub use handlers::AppState;
pub use parse::{parse_buttons, parse_delay};
pub use runner::run_bot;
pub use telegram::{classify_send_error, TelegramTransport};
