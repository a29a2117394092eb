use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::BotClient;
pub use types::{
    CallbackQuery, ChatAction, ChosenInlineResult, Message, SendOptions, Update, UpdateKind,
};

/// Long-poll timeout handed to `getUpdates`.
pub const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API Error:\n[{code}]\n{description}")]
    Api { code: i64, description: String },
    #[error("Telegram API returned no result for {0}")]
    MissingResult(String),
}

/// The Bot API calls the router and handlers rely on.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        options: SendOptions,
    ) -> Result<(), TelegramError>;

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), TelegramError>;

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError>;
}
