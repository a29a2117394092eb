use crate::command::parser::ParsedCommand;
use crate::command::registry::{Command, Registry};
use crate::command::{HandlerContext, HandlerOutcome};
use crate::telegram::{ChatAction, Message, SendOptions};
use futures::future::BoxFuture;

pub const USAGE: &str = "Usage:\n/startgame   - Starts a new game\n";

pub const START_GAME_REPLY: &str =
    "Empezando una nueva partida.\nSi quieres jugar usa el comando\n/join";

pub fn handle_start_game<'a>(
    _parsed: &'a ParsedCommand,
    message: &'a Message,
    ctx: &'a HandlerContext,
) -> BoxFuture<'a, HandlerOutcome> {
    Box::pin(async move {
        let chat_id = message.chat.id;
        let typing = ctx
            .transport
            .send_chat_action(chat_id, ChatAction::Typing)
            .await;

        let log_message = format!(
            "Iniciando juego en chat {} por petición de {} ({})",
            chat_id,
            message.sender_first_name(),
            message.sender_id()
        );
        println!("{}", log_message);
        let logged = ctx.logger.info(&log_message).await;

        let sent = ctx
            .transport
            .send_message(chat_id, START_GAME_REPLY, SendOptions::default())
            .await;

        HandlerOutcome::none()
            .with_reply(typing)
            .with_reply(sent)
            .with_log(logged)
    })
}

pub fn handle_join<'a>(
    _parsed: &'a ParsedCommand,
    message: &'a Message,
    ctx: &'a HandlerContext,
) -> BoxFuture<'a, HandlerOutcome> {
    Box::pin(async move {
        let chat_id = message.chat.id;
        let first_name = message.sender_first_name();

        let log_message = format!(
            "{} ({}) se ha unido a la partida del chat {}",
            first_name,
            message.sender_id(),
            chat_id
        );
        println!("{}", log_message);
        let logged = ctx.logger.info(&log_message).await;

        let reply = format!("*{}* se ha unido a la partida.", first_name);
        let sent = ctx
            .transport
            .send_message(chat_id, &reply, SendOptions::markdown())
            .await;

        HandlerOutcome::none().with_reply(sent).with_log(logged)
    })
}

pub fn handle_usage<'a>(
    _parsed: &'a ParsedCommand,
    message: &'a Message,
    ctx: &'a HandlerContext,
) -> BoxFuture<'a, HandlerOutcome> {
    Box::pin(async move {
        let sent = ctx
            .transport
            .send_message(message.chat.id, USAGE, SendOptions::remove_keyboard())
            .await;
        HandlerOutcome::none().with_reply(sent)
    })
}

pub fn register_all_commands(registry: &mut Registry) {
    registry.register(Command {
        name: "startgame".to_string(),
        handler: handle_start_game,
    });

    registry.register(Command {
        name: "join".to_string(),
        handler: handle_join,
    });

    registry.set_fallback(handle_usage);
}
