use futures::{stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::command::handlers::register_all_commands;
use crate::command::{HandlerContext, HandlerError, HandlerOutcome, Registry};
use crate::logging::LogWriter;
use crate::telegram::{
    CallbackQuery, ChosenInlineResult, Message, SendOptions, Transport, Update, UpdateKind,
    POLL_TIMEOUT_SECS,
};

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(1);

pub struct Router {
    ctx: HandlerContext,
    registry: Registry,
}

impl Router {
    pub fn new(transport: Arc<dyn Transport>, logger: Arc<LogWriter>) -> Self {
        let mut registry = Registry::new();
        register_all_commands(&mut registry);

        Self {
            ctx: HandlerContext::new(transport, logger),
            registry,
        }
    }

    /// Polls for updates until `cancel` fires.
    ///
    /// Updates of one batch are handled concurrently; the next poll starts
    /// once the whole batch is done, so cancellation never abandons a handler
    /// half way.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut offset: Option<i64> = None;

        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                polled = self.ctx.transport.get_updates(offset, POLL_TIMEOUT_SECS) => polled,
            };

            match polled {
                Ok(updates) => {
                    if let Some(last) = updates.iter().map(|u| u.update_id).max() {
                        offset = Some(last + 1);
                    }
                    let router = self;
                    stream::iter(updates)
                        .for_each_concurrent(None, move |update| async move {
                            router.handle_update(&update).await;
                        })
                        .await;
                }
                Err(e) => {
                    self.handle_error(&HandlerError::from(e)).await;
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                    }
                }
            }
        }
    }

    pub async fn handle_update(&self, update: &Update) {
        let outcome = self.dispatch(update).await;
        for error in outcome.into_errors() {
            self.handle_error(&error).await;
        }
    }

    pub async fn dispatch(&self, update: &Update) -> HandlerOutcome {
        match update.kind() {
            UpdateKind::Message(message) | UpdateKind::EditedMessage(message) => {
                self.on_message(message).await
            }
            UpdateKind::CallbackQuery(query) => self.on_callback_query(query).await,
            UpdateKind::ChosenInlineResult(result) => self.on_chosen_inline_result(result).await,
            UpdateKind::Unknown(kind) => self.on_unknown(&kind).await,
        }
    }

    /// Prints the failure and records it as FATAL. A failed log write is
    /// only reported on stderr.
    pub async fn handle_error(&self, error: &HandlerError) {
        let message = error.to_string();
        eprintln!("{}", message);
        if let Err(e) = self.ctx.logger.fatal(&message).await {
            eprintln!("could not write to {}: {}", self.ctx.logger.path().display(), e);
        }
    }

    async fn on_message(&self, message: &Message) -> HandlerOutcome {
        println!("Receive message type: {}", message.content_type());
        match message.text.as_deref() {
            Some(text) => self.registry.dispatch_text(text, message, &self.ctx).await,
            None => HandlerOutcome::none(),
        }
    }

    async fn on_callback_query(&self, query: &CallbackQuery) -> HandlerOutcome {
        let answered = self.ctx.transport.answer_callback_query(&query.id).await;
        let outcome = HandlerOutcome::none().with_reply(answered);

        let wants_to_play = match parse_callback_flag(query.data.as_deref()) {
            Ok(flag) => flag,
            Err(e) => return outcome.with_reply(Err(e)),
        };

        match (wants_to_play, query.message.as_ref().map(|m| m.chat.id)) {
            (true, Some(chat_id)) => {
                let text = format!("{} quiere jugar!", query.from.first_name);
                let sent = self
                    .ctx
                    .transport
                    .send_message(chat_id, &text, SendOptions::default())
                    .await;
                outcome.with_reply(sent)
            }
            _ => outcome,
        }
    }

    async fn on_chosen_inline_result(&self, result: &ChosenInlineResult) -> HandlerOutcome {
        let message = format!("Received inline result: {}", result.result_id);
        println!("{}", message);
        HandlerOutcome::none().with_log(self.ctx.logger.info(&message).await)
    }

    async fn on_unknown(&self, kind: &str) -> HandlerOutcome {
        let message = format!("Unknown update type: {}", kind);
        println!("{}", message);
        HandlerOutcome::none().with_log(self.ctx.logger.error(&message).await)
    }
}

/// `true`/`false` in any case; missing data counts as `false`.
fn parse_callback_flag(data: Option<&str>) -> Result<bool, HandlerError> {
    match data.map(str::trim) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(HandlerError::InvalidCallbackData(v.to_string())),
    }
}
