//! broadcast-bot CLI: run the bot. Config comes from env with optional CLI overrides.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bcast")]
#[command(about = "Telegram broadcast bot: throttled fan-out with scheduling", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}
