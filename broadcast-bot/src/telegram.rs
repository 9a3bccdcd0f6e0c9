//! Teloxide implementation of [`BroadcastTransport`].
//!
//! Maps transport errors into the permanent/transient taxonomy by inspecting
//! the reported API error, and builds inline keyboards from draft buttons.

use async_trait::async_trait;
use bcast_core::{BroadcastTransport, Button, ContentRef, DispatchMode, Membership, SendError};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, UserId,
};
use teloxide::{ApiError, RequestError};

pub struct TelegramTransport {
    bot: teloxide::Bot,
}

impl TelegramTransport {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

/// Classifies a teloxide error into the send-failure taxonomy. A recipient that
/// blocked the bot or deactivated their account is gone for good; everything
/// else is a one-off. Unknown API error strings fall back to a reason-text
/// check so unmapped responses still classify correctly.
pub fn classify_send_error(err: &RequestError) -> SendError {
    match err {
        RequestError::Api(ApiError::BotBlocked) | RequestError::Api(ApiError::UserDeactivated) => {
            SendError::Permanent(err.to_string())
        }
        RequestError::Api(api) => {
            let reason = api.to_string().to_lowercase();
            if reason.contains("bot was blocked") || reason.contains("deactivated") {
                SendError::Permanent(err.to_string())
            } else {
                SendError::Transient(err.to_string())
            }
        }
        _ => SendError::Transient(err.to_string()),
    }
}

fn build_markup(buttons: &[Button]) -> Result<InlineKeyboardMarkup, SendError> {
    let mut rows = Vec::with_capacity(buttons.len());
    for button in buttons {
        let url = reqwest::Url::parse(&button.url).map_err(|e| {
            SendError::Transient(format!("invalid button url '{}': {}", button.url, e))
        })?;
        rows.push(vec![InlineKeyboardButton::url(button.label.clone(), url)]);
    }
    Ok(InlineKeyboardMarkup::new(rows))
}

#[async_trait]
impl BroadcastTransport for TelegramTransport {
    async fn send_to(
        &self,
        recipient: i64,
        content: &ContentRef,
        mode: DispatchMode,
        buttons: &[Button],
    ) -> Result<(), SendError> {
        let to = ChatId(recipient);
        let from = ChatId(content.source_chat);
        let message = MessageId(content.message_id);

        match mode {
            DispatchMode::Forward => {
                self.bot
                    .forward_message(to, from, message)
                    .await
                    .map_err(|e| classify_send_error(&e))?;
            }
            DispatchMode::Copy => {
                let mut request = self.bot.copy_message(to, from, message);
                if !buttons.is_empty() {
                    request = request.reply_markup(build_markup(buttons)?);
                }
                request.await.map_err(|e| classify_send_error(&e))?;
            }
        }
        Ok(())
    }

    async fn notify(&self, chat: i64, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(ChatId(chat), text)
            .parse_mode(ParseMode::Markdown)
            .await
            .map_err(|e| classify_send_error(&e))?;
        Ok(())
    }

    async fn check_membership(&self, group: i64, user: i64) -> Result<Membership, SendError> {
        let member = self
            .bot
            .get_chat_member(ChatId(group), UserId(user as u64))
            .await
            .map_err(|e| classify_send_error(&e))?;

        if member.kind.is_present() {
            Ok(Membership::Member)
        } else {
            Ok(Membership::NotMember)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_is_permanent() {
        let err = RequestError::Api(ApiError::BotBlocked);
        assert!(matches!(classify_send_error(&err), SendError::Permanent(_)));
    }

    #[test]
    fn test_deactivated_is_permanent() {
        let err = RequestError::Api(ApiError::UserDeactivated);
        assert!(matches!(classify_send_error(&err), SendError::Permanent(_)));
    }

    #[test]
    fn test_unknown_reason_text_fallback() {
        let err = RequestError::Api(ApiError::Unknown(
            "Forbidden: bot was blocked by the user".to_string(),
        ));
        assert!(matches!(classify_send_error(&err), SendError::Permanent(_)));
    }

    #[test]
    fn test_other_api_errors_are_transient() {
        let err = RequestError::Api(ApiError::Unknown("Bad Request: chat not found".to_string()));
        assert!(matches!(classify_send_error(&err), SendError::Transient(_)));
    }

    #[test]
    fn test_markup_rejects_bad_url() {
        let buttons = vec![Button {
            label: "x".to_string(),
            url: "not-a-url".to_string(),
        }];
        assert!(build_markup(&buttons).is_err());
    }

    #[test]
    fn test_markup_one_button_per_row() {
        let buttons = vec![
            Button {
                label: "A".to_string(),
                url: "https://example.com/a".to_string(),
            },
            Button {
                label: "B".to_string(),
                url: "https://example.com/b".to_string(),
            },
        ];
        let markup = build_markup(&buttons).expect("markup");
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 1);
    }
}
