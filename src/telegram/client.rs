use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::types::{
    ApiResponse, ChatAction, GetUpdatesRequest, Message, SendMessageRequest, SendOptions, Update,
    User,
};
use super::{TelegramError, Transport, POLL_TIMEOUT_SECS};

const API_BASE_URL: &str = "https://api.telegram.org";

/// Headroom over the long-poll timeout before a request is abandoned.
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 10;

fn request_timeout() -> Duration {
    Duration::from_secs(POLL_TIMEOUT_SECS + REQUEST_TIMEOUT_MARGIN_SECS)
}

pub struct BotClient {
    client: Client,
    base_url: String,
    token: String,
}

impl BotClient {
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        Self::with_base_url(token, API_BASE_URL)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, TelegramError> {
        Ok(Self {
            client: Client::builder().timeout(request_timeout()).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        // Error responses carry a JSON body too, so the status is not checked
        // separately.
        let response: ApiResponse<R> = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        into_result(method, response)
    }

    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        options: SendOptions,
    ) -> Result<Message, TelegramError> {
        self.call("sendMessage", &SendMessageRequest::new(chat_id, text, options))
            .await
    }
}

fn into_result<R>(method: &str, response: ApiResponse<R>) -> Result<R, TelegramError> {
    if !response.ok {
        return Err(TelegramError::Api {
            code: response.error_code.unwrap_or_default(),
            description: response.description.unwrap_or_default(),
        });
    }
    response
        .result
        .ok_or_else(|| TelegramError::MissingResult(method.to_string()))
}

#[async_trait]
impl Transport for BotClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
        };
        self.call("getUpdates", &params).await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        options: SendOptions,
    ) -> Result<(), TelegramError> {
        self.send_text(chat_id, text, options).await.map(|_| ())
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), TelegramError> {
        let params = serde_json::json!({ "chat_id": chat_id, "action": action });
        self.call::<_, bool>("sendChatAction", &params).await.map(|_| ())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let params = serde_json::json!({ "callback_query_id": callback_query_id });
        self.call::<_, bool>("answerCallbackQuery", &params)
            .await
            .map(|_| ())
    }
}
