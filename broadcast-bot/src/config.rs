//! Bot config: Telegram connection, operator identities, throttling, scheduler
//! timing, logging, database. Loaded from env.

use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// ADMIN_USER_ID: the only identity allowed to broadcast.
    pub admin_user_id: i64,
    /// TARGET_GROUP_ID: membership in this group gates subscription.
    pub target_group_id: i64,
    /// DATABASE_URL (SQLite file path or `sqlite::memory:`)
    pub database_url: String,
    /// LOG_FILE path
    pub log_file: String,
    /// BROADCAST_RATE_LIMIT: messages per second ceiling for a dispatch run.
    pub rate_limit: u32,
    /// SCHEDULER_POLL_SECS: seconds between job-store polls.
    pub poll_interval_secs: u64,
    /// SCHEDULER_STARTUP_DELAY_SECS: delay before the first poll.
    pub startup_delay_secs: u64,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL (optional override, e.g. a local bot API server)
    pub telegram_api_url: Option<String>,
}

impl BotConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    /// Missing required values are a startup-fatal configuration error.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let admin_user_id = required_i64("ADMIN_USER_ID")?;
        let target_group_id = required_i64("TARGET_GROUP_ID")?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "broadcast_bot.db".to_string());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/broadcast-bot.log".to_string());
        let rate_limit = env::var("BROADCAST_RATE_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(25);
        let poll_interval_secs = env::var("SCHEDULER_POLL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let startup_delay_secs = env::var("SCHEDULER_STARTUP_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();

        Ok(Self {
            bot_token,
            admin_user_id,
            target_group_id,
            database_url,
            log_file,
            rate_limit,
            poll_interval_secs,
            startup_delay_secs,
            telegram_api_url,
        })
    }

    /// Validate config: throttle ceiling must be positive, the API URL override
    /// must be a valid URL when set.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit == 0 {
            anyhow::bail!("BROADCAST_RATE_LIMIT must be at least 1 msg/sec");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("SCHEDULER_POLL_SECS must be at least 1");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }
}

fn required_i64(name: &str) -> Result<i64> {
    env::var(name)
        .map_err(|_| anyhow::anyhow!("{} not set", name))?
        .parse()
        .map_err(|_| anyhow::anyhow!("{} is not a valid integer", name))
}
