use std::sync::Arc;

use crate::logging::{LogError, LogWriter};
use crate::telegram::{TelegramError, Transport};

pub mod handlers;
pub mod parser;
pub mod registry;

pub use registry::Registry;

/// Everything a handler may touch: the outbound transport and the log.
#[derive(Clone)]
pub struct HandlerContext {
    pub transport: Arc<dyn Transport>,
    pub logger: Arc<LogWriter>,
}

impl HandlerContext {
    pub fn new(transport: Arc<dyn Transport>, logger: Arc<LogWriter>) -> Self {
        Self { transport, logger }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Telegram(#[from] TelegramError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error("String '{0}' was not recognized as a valid Boolean.")]
    InvalidCallbackData(String),
}

/// What a handler attempted and how each attempt went.
///
/// Every outbound call and the log line are recorded independently, so one
/// failure never hides the result of another.
#[derive(Debug, Default)]
pub struct HandlerOutcome {
    pub replies: Vec<Result<(), HandlerError>>,
    pub log: Option<Result<(), LogError>>,
}

impl HandlerOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    /// Records one outbound call. Call once per attempt.
    pub fn with_reply<E: Into<HandlerError>>(mut self, result: Result<(), E>) -> Self {
        self.replies.push(result.map_err(Into::into));
        self
    }

    pub fn with_log(mut self, result: Result<(), LogError>) -> Self {
        self.log = Some(result);
        self
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.replies.iter().all(Result::is_ok) && !matches!(self.log, Some(Err(_)))
    }

    pub fn into_errors(self) -> Vec<HandlerError> {
        let mut errors: Vec<HandlerError> =
            self.replies.into_iter().filter_map(Result::err).collect();
        if let Some(Err(e)) = self.log {
            errors.push(HandlerError::Log(e));
        }
        errors
    }
}
