//! Shared fixtures for handler and router tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::command::HandlerContext;
use crate::logging::tests::fixed_clock;
use crate::logging::LogWriter;
use crate::telegram::{ChatAction, Message, SendOptions, TelegramError, Transport, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetUpdates(Option<i64>),
    SendMessage {
        chat_id: i64,
        text: String,
        options: SendOptions,
    },
    ChatAction(i64, ChatAction),
    AnswerCallback(String),
}

#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    batches: Mutex<VecDeque<Result<Vec<Update>, TelegramError>>>,
    fail_sends: AtomicBool,
    drained: Mutex<Option<CancellationToken>>,
}

impl MockTransport {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<(i64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendMessage { chat_id, text, .. } => Some((chat_id, text)),
                _ => None,
            })
            .collect()
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn push_batch(&self, batch: Result<Vec<Update>, TelegramError>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    /// Cancels `token` once every queued batch has been handed out.
    pub fn cancel_when_drained(&self, token: CancellationToken) {
        *self.drained.lock().unwrap() = Some(token);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn send_result(&self) -> Result<(), TelegramError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            Err(TelegramError::Api {
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        _timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.record(Call::GetUpdates(offset));
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                if let Some(token) = self.drained.lock().unwrap().as_ref() {
                    token.cancel();
                }
                Ok(vec![])
            }
        }
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        options: SendOptions,
    ) -> Result<(), TelegramError> {
        self.record(Call::SendMessage {
            chat_id,
            text: text.to_string(),
            options,
        });
        self.send_result()
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), TelegramError> {
        self.record(Call::ChatAction(chat_id, action));
        self.send_result()
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        self.record(Call::AnswerCallback(callback_query_id.to_string()));
        self.send_result()
    }
}

/// A mock transport plus a log writer in a scratch directory.
pub struct TestBot {
    pub transport: Arc<MockTransport>,
    pub logger: Arc<LogWriter>,
    pub ctx: HandlerContext,
    pub log_path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestBot {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("kamarada.log");
        let transport = Arc::new(MockTransport::default());
        let logger = Arc::new(LogWriter::open(&log_path, fixed_clock()).unwrap());
        let ctx = HandlerContext::new(transport.clone(), logger.clone());
        Self {
            transport,
            logger,
            ctx,
            log_path,
            _dir: dir,
        }
    }

    /// Log lines after the creation header.
    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_path)
            .unwrap()
            .lines()
            .skip(1)
            .map(|l| l.to_string())
            .collect()
    }

    /// Removes the log directory so every further write fails.
    pub fn break_log(&self) {
        std::fs::remove_dir_all(self._dir.path()).unwrap();
    }
}

pub fn text_message(chat_id: i64, user_id: i64, first_name: &str, text: &str) -> Message {
    serde_json::from_value(serde_json::json!({
        "message_id": 1,
        "from": {"id": user_id, "is_bot": false, "first_name": first_name},
        "chat": {"id": chat_id, "type": "group"},
        "date": 1700000000,
        "text": text,
    }))
    .unwrap()
}

pub fn update(value: serde_json::Value) -> Update {
    serde_json::from_value(value).unwrap()
}

pub fn message_update(update_id: i64, chat_id: i64, text: &str) -> Update {
    update(serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": {"id": 42, "is_bot": false, "first_name": "Ana"},
            "chat": {"id": chat_id, "type": "group"},
            "date": 1700000000,
            "text": text,
        }
    }))
}
