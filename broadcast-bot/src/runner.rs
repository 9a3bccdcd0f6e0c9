//! Runner: validates config, builds storage/transport/engine, notifies the
//! admin that the bot is up, spawns the scheduler, and drives the teloxide
//! dispatcher until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bcast_core::{init_tracing, BroadcastTransport, JobStore, SubscriberDirectory};
use dispatch::{ConfirmationGate, DispatchEngine, Scheduler};
use storage::{ScheduledJobRepository, SqlitePoolManager, SubscriberRepository};
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::config::BotConfig;
use crate::handlers::{handle_callback, handle_message, AppState};
use crate::telegram::TelegramTransport;

/// Main entry: fatal on configuration or storage-init errors, then runs the
/// update loop until ctrl-c.
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;
    init_tracing(&config.log_file)?;

    info!(
        database_url = %config.database_url,
        rate_limit = config.rate_limit,
        "Initializing broadcast bot"
    );

    let pool = SqlitePoolManager::new(&config.database_url)
        .await
        .context("Failed to open database")?;
    let directory: Arc<dyn SubscriberDirectory> = Arc::new(
        SubscriberRepository::with_pool(pool.clone())
            .await
            .context("Failed to init subscriber directory")?,
    );
    let jobs: Arc<dyn JobStore> = Arc::new(
        ScheduledJobRepository::with_pool(pool)
            .await
            .context("Failed to init job store")?,
    );

    let mut bot = Bot::new(config.bot_token.clone());
    if let Some(ref url) = config.telegram_api_url {
        bot = bot.set_api_url(url.parse().context("Invalid TELEGRAM_API_URL")?);
    }

    let transport: Arc<dyn BroadcastTransport> = Arc::new(TelegramTransport::new(bot.clone()));
    let engine = Arc::new(DispatchEngine::new(
        Arc::clone(&transport),
        Arc::clone(&directory),
        config.rate_limit,
    ));

    Scheduler::new(Arc::clone(&jobs), Arc::clone(&engine))
        .with_timing(
            Duration::from_secs(config.poll_interval_secs),
            Duration::from_secs(config.startup_delay_secs),
        )
        .spawn();

    let startup_notice = format!(
        "🤖 Bot is now ONLINE!\n\nThrottling: {} msg/sec\nScheduler poll: every {} s\nUse /vip to see your admin commands.",
        config.rate_limit, config.poll_interval_secs
    );
    if let Err(e) = transport.notify(config.admin_user_id, &startup_notice).await {
        error!(error = %e, "Could not deliver startup notification");
    }

    let state = Arc::new(AppState {
        config,
        transport,
        directory,
        jobs,
        engine,
        gate: ConfirmationGate::new(),
    });

    info!("Bot started successfully");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|update| async move {
            tracing::debug!(update_id = ?update.id, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Update handler failed"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
