//! Operator command and callback handlers.
//!
//! Commands arrive in the admin's private chat (plus `/start` from anyone);
//! confirmations come back as inline-button callback queries carrying the
//! pending id issued by the gate.

use std::sync::Arc;

use anyhow::Result;
use bcast_core::{
    BroadcastDraft, BroadcastTransport, ContentRef, DispatchMode, JobStore, Membership,
    ScheduledJob, Subscriber, SubscriberDirectory,
};
use chrono::Utc;
use dispatch::{Confirmation, ConfirmationGate, DispatchEngine, PendingAction};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, User};
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::parse::{parse_buttons, parse_delay};

const CONFIRM_PREFIX: &str = "bcast:confirm:";
const CANCEL_PREFIX: &str = "bcast:cancel:";

const VIP_MENU: &str = "👑 Admin menu\n\n\
/vip\n› Shows this menu.\n\n\
/send\n› Reply to a message with this command. The bot asks for confirmation.\n\
› Without buttons the message is FORWARDED; with buttons it is COPIED.\n\n\
/schedule <delay>\n› Like /send, but fires later. Delay is 10m, 2h, or 1d.\n\n\
Buttons (for /send and /schedule):\n› Add them on new lines after the command as `label | url`.\n\n\
/stats\n› Shows the subscriber count.\n\n\
/remshed\n› Cancels every scheduled broadcast.\n\n\
/getuser <id>\n› Shows a subscriber's details.\n\n\
/deluser <id>\n› Removes a subscriber.";

/// Shared handler dependencies, injected into the dispatcher.
pub struct AppState {
    pub config: BotConfig,
    pub transport: Arc<dyn BroadcastTransport>,
    pub directory: Arc<dyn SubscriberDirectory>,
    pub jobs: Arc<dyn JobStore>,
    pub engine: Arc<DispatchEngine>,
    pub gate: ConfirmationGate,
}

fn confirm_keyboard(pending_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ YES, go ahead",
            format!("{}{}", CONFIRM_PREFIX, pending_id),
        )],
        vec![InlineKeyboardButton::callback(
            "❌ NO, cancel",
            format!("{}{}", CANCEL_PREFIX, pending_id),
        )],
    ])
}

fn operation_label(draft: &BroadcastDraft) -> &'static str {
    match draft.mode() {
        DispatchMode::Forward => "FORWARD",
        DispatchMode::Copy => "COPY (with buttons)",
    }
}

/// Routes one incoming message. Non-private chats only react to `/start` in
/// the target group; everything except `/start` requires the admin identity.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(text) = msg.text().map(|t| t.to_string()) else {
        return Ok(());
    };
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let command = text.split_whitespace().next().unwrap_or("");
    let command = command.split('@').next().unwrap_or(command);

    if !msg.chat.is_private() {
        if command == "/start" && msg.chat.id.0 == state.config.target_group_id {
            let name = user
                .username
                .clone()
                .unwrap_or_else(|| user.first_name.clone());
            bot.send_message(
                msg.chat.id,
                format!("👋 @{}, please send me /start privately (in a DM)!", name),
            )
            .await?;
        }
        return Ok(());
    }

    let chat = msg.chat.id.0;
    match command {
        "/start" => on_start(&state, &user, chat).await,
        _ if user_id != state.config.admin_user_id => Ok(()),
        "/vip" => {
            state.transport.notify(chat, VIP_MENU).await?;
            Ok(())
        }
        "/send" => on_send(&bot, &msg, &state, &text).await,
        "/schedule" => on_schedule(&bot, &msg, &state, &text).await,
        "/stats" => on_stats(&state, chat).await,
        "/remshed" => on_cancel_schedules(&state, chat).await,
        "/getuser" => on_get_user(&state, chat, &text).await,
        "/deluser" => on_del_user(&state, chat, &text).await,
        _ => Ok(()),
    }
}

/// `/start` in a DM: membership-gated subscription.
async fn on_start(state: &AppState, user: &User, chat: i64) -> Result<()> {
    let user_id = user.id.0 as i64;
    info!(user_id, "Received /start");

    match state
        .transport
        .check_membership(state.config.target_group_id, user_id)
        .await
    {
        Err(e) => {
            warn!(user_id, error = %e, "Membership check failed");
            state
                .transport
                .notify(
                    chat,
                    "⚠️ We could not verify your membership right now. Please try again later.",
                )
                .await?;
            let alert = format!(
                "🆘 CRITICAL: could not check membership of user `{}` in group `{}`.\n\nError: {}\n\n👉 Make sure the bot is an ADMINISTRATOR of the group!",
                user_id, state.config.target_group_id, e
            );
            if let Err(alert_err) = state
                .transport
                .notify(state.config.admin_user_id, &alert)
                .await
            {
                error!(error = %alert_err, "Could not alert admin about membership-check failure");
            }
            Ok(())
        }
        Ok(Membership::NotMember) => {
            info!(user_id, "Registration refused: not a group member");
            state
                .transport
                .notify(
                    chat,
                    "⛔ Registration failed\n\nTo receive broadcasts you must be a member of our main group.\nJoin the group, then send /start here again.",
                )
                .await?;
            Ok(())
        }
        Ok(Membership::Member) => {
            let subscriber = Subscriber::new(
                user_id,
                user.username.clone(),
                Some(user.first_name.clone()),
                user.last_name.clone(),
            );
            if state.directory.add(&subscriber).await? {
                state
                    .transport
                    .notify(
                        chat,
                        "✅ Registered!\n\nYou were added to the broadcast list.",
                    )
                    .await?;
            } else {
                state
                    .transport
                    .notify(chat, "ℹ️ You are already on the broadcast list.")
                    .await?;
            }
            Ok(())
        }
    }
}

/// `/send`: propose an immediate broadcast of the replied-to message.
async fn on_send(bot: &Bot, msg: &Message, state: &AppState, text: &str) -> Result<()> {
    let Some(reply) = msg.reply_to_message() else {
        state
            .transport
            .notify(
                msg.chat.id.0,
                "⚠️ Usage: reply to the message you want to broadcast and type /send.\nAdd buttons on new lines as `label | url`.",
            )
            .await?;
        return Ok(());
    };

    let draft = BroadcastDraft::new(
        ContentRef {
            source_chat: reply.chat.id.0,
            message_id: reply.id.0,
        },
        parse_buttons(text),
        msg.chat.id.0,
    );
    let total = state.directory.count().await?;
    let operation = operation_label(&draft);
    let pending_id = state
        .gate
        .propose(msg.chat.id.0, PendingAction::Broadcast(draft));

    bot.send_message(
        msg.chat.id,
        format!(
            "⚠️ Confirm broadcast\n\nYou are about to {} this message.\nTotal subscribers: {}\n\nPlease confirm:",
            operation, total
        ),
    )
    .reply_markup(confirm_keyboard(&pending_id))
    .await?;
    Ok(())
}

/// `/schedule <delay>`: propose a deferred broadcast of the replied-to message.
async fn on_schedule(bot: &Bot, msg: &Message, state: &AppState, text: &str) -> Result<()> {
    let chat = msg.chat.id.0;
    let Some(reply) = msg.reply_to_message() else {
        state
            .transport
            .notify(
                chat,
                "⚠️ Usage: reply to a message with `/schedule <delay>` (e.g. `/schedule 2h`).",
            )
            .await?;
        return Ok(());
    };
    let Some(delay_arg) = text.split_whitespace().nth(1) else {
        state
            .transport
            .notify(
                chat,
                "⚠️ A delay is required.\nUse `/schedule 10m`, `/schedule 2h`, or `/schedule 1d`.",
            )
            .await?;
        return Ok(());
    };
    let Some(delay) = parse_delay(delay_arg) else {
        state
            .transport
            .notify(
                chat,
                "⚠️ Bad delay format.\nUse `m` (minutes), `h` (hours), or `d` (days), e.g. `/schedule 2h`.",
            )
            .await?;
        return Ok(());
    };

    let draft = BroadcastDraft::new(
        ContentRef {
            source_chat: reply.chat.id.0,
            message_id: reply.id.0,
        },
        parse_buttons(text),
        chat,
    );
    let total = state.directory.count().await?;
    let operation = operation_label(&draft);
    let pending_id = state
        .gate
        .propose(chat, PendingAction::Schedule { draft, delay });

    bot.send_message(
        msg.chat.id,
        format!(
            "⏳ Confirm schedule\n\nYou are about to {} this message.\nTotal subscribers: {}\nSends in: {}\n\nPlease confirm:",
            operation, total, delay_arg
        ),
    )
    .reply_markup(confirm_keyboard(&pending_id))
    .await?;
    Ok(())
}

async fn on_stats(state: &AppState, chat: i64) -> Result<()> {
    let total = state.directory.count().await?;
    state
        .transport
        .notify(chat, &format!("📊 Bot statistics\nTotal subscribers: {}", total))
        .await?;
    Ok(())
}

/// `/remshed`: cancel every stored scheduled broadcast.
async fn on_cancel_schedules(state: &AppState, chat: i64) -> Result<()> {
    let removed = state.jobs.delete_all().await?;
    info!(removed, "Admin cancelled scheduled broadcasts");
    let reply = if removed == 0 {
        "ℹ️ There are no scheduled broadcasts to cancel.".to_string()
    } else {
        format!("✅ Cancelled {} scheduled broadcast(s).", removed)
    };
    state.transport.notify(chat, &reply).await?;
    Ok(())
}

async fn on_get_user(state: &AppState, chat: i64, text: &str) -> Result<()> {
    let Some(id) = parse_user_arg(text) else {
        state
            .transport
            .notify(chat, "Usage: `/getuser <USER_ID>` (digits only).")
            .await?;
        return Ok(());
    };

    match state.directory.get(id).await? {
        Some(sub) => {
            let username = sub
                .username
                .map(|u| format!("@{}", u))
                .unwrap_or_else(|| "N/A".to_string());
            let reply = format!(
                "👤 Subscriber `{}`\n\nFirst name: {}\nLast name: {}\nUsername: {}\nSubscribed on: {}",
                sub.id,
                sub.first_name.unwrap_or_else(|| "N/A".to_string()),
                sub.last_name.unwrap_or_else(|| "N/A".to_string()),
                username,
                sub.subscribed_at.format("%Y-%m-%d %H:%M:%S"),
            );
            state.transport.notify(chat, &reply).await?;
        }
        None => {
            state
                .transport
                .notify(chat, &format!("⚠️ User {} is not on the broadcast list.", id))
                .await?;
        }
    }
    Ok(())
}

async fn on_del_user(state: &AppState, chat: i64, text: &str) -> Result<()> {
    let Some(id) = parse_user_arg(text) else {
        state
            .transport
            .notify(chat, "Usage: `/deluser <USER_ID>` (digits only).")
            .await?;
        return Ok(());
    };

    let reply = if state.directory.remove(id).await? {
        format!("✅ User {} was removed from the broadcast list.", id)
    } else {
        format!("⚠️ User {} is not on the broadcast list.", id)
    };
    state.transport.notify(chat, &reply).await?;
    Ok(())
}

fn parse_user_arg(text: &str) -> Option<i64> {
    text.split_whitespace().nth(1)?.parse().ok()
}

/// Routes one confirmation button press through the gate.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> Result<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.clone() else {
        return Ok(());
    };
    let Some(message) = q.regular_message() else {
        debug!("Callback on an inaccessible message, ignoring");
        return Ok(());
    };
    let chat_id = message.chat.id;
    let message_id = message.id;
    let session = chat_id.0;

    if let Some(pending_id) = data.strip_prefix(CONFIRM_PREFIX) {
        match state.gate.confirm(session, pending_id) {
            Confirmation::Expired => {
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "⚠️ This action has expired or was already handled.",
                )
                .await?;
            }
            Confirmation::Released(PendingAction::Broadcast(draft)) => {
                bot.edit_message_text(chat_id, message_id, "✅ Confirmed. Broadcast starting…")
                    .await?;
                state.engine.spawn(draft);
            }
            Confirmation::Released(PendingAction::Schedule { draft, delay }) => {
                let due_at = Utc::now() + chrono::Duration::seconds(delay.as_secs() as i64);
                let job = ScheduledJob::new(draft.clone(), due_at);
                match state.jobs.insert(&job).await {
                    Ok(()) => {
                        info!(job_id = %job.id, due_at = %due_at, "Scheduled broadcast stored");
                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            format!(
                                "✅ Scheduled!\n\nThe broadcast fires at {} UTC.",
                                due_at.format("%Y-%m-%d %H:%M:%S")
                            ),
                        )
                        .await?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not store scheduled job, draft kept pending");
                        let pending_id = state
                            .gate
                            .propose(session, PendingAction::Schedule { draft, delay });
                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            format!(
                                "⚠️ Could not store the schedule: {}\n\nThe draft is still pending; confirm to retry or cancel.",
                                e
                            ),
                        )
                        .reply_markup(confirm_keyboard(&pending_id))
                        .await?;
                    }
                }
            }
        }
    } else if let Some(pending_id) = data.strip_prefix(CANCEL_PREFIX) {
        let reply = if state.gate.cancel(session, pending_id) {
            "❌ Cancelled. Nothing was sent."
        } else {
            "⚠️ This action has expired or was already handled."
        };
        bot.edit_message_text(chat_id, message_id, reply).await?;
    }

    Ok(())
}
