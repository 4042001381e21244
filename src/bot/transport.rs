use crate::bot::views::{inline_keyboard, MenuOption};
use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tracing::debug;

/// Outbound side of a conversation with a single chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send a message with one selectable option per row.
    async fn send_menu(&self, text: &str, options: &[MenuOption]) -> Result<()>;

    /// Send a binary file as a document attachment.
    async fn send_document(&self, file_name: &str, content: Vec<u8>, caption: &str) -> Result<()>;
}

/// Telegram-backed transport bound to one chat.
pub struct TelegramTransport {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramTransport {
    /// Create a Telegram transport for `chat_id`.
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn send_menu(&self, text: &str, options: &[MenuOption]) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .reply_markup(inline_keyboard(options))
            .await?;
        Ok(())
    }

    async fn send_document(&self, file_name: &str, content: Vec<u8>, caption: &str) -> Result<()> {
        debug!(
            file_name = %file_name,
            size = content.len(),
            chat_id = self.chat_id.0,
            "Sending document"
        );
        let file = InputFile::memory(content).file_name(file_name.to_string());
        self.bot
            .send_document(self.chat_id, file)
            .caption(caption)
            .await?;
        Ok(())
    }
}
