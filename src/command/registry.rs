use crate::command::parser::{parse_input, InputType, ParsedCommand};
use crate::command::{HandlerContext, HandlerOutcome};
use crate::telegram::Message;
use futures::future::BoxFuture;
use std::collections::HashMap;

pub type CommandHandler = for<'a> fn(
    &'a ParsedCommand,
    &'a Message,
    &'a HandlerContext,
) -> BoxFuture<'a, HandlerOutcome>;

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub handler: CommandHandler,
}

pub struct Registry {
    commands: HashMap<String, Command>,
    fallback: Option<CommandHandler>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            fallback: None,
        }
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    /// Handler for text that does not name a registered command.
    pub fn set_fallback(&mut self, handler: CommandHandler) {
        self.fallback = Some(handler);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub async fn execute<'a>(
        &self,
        parsed: &'a ParsedCommand,
        message: &'a Message,
        ctx: &'a HandlerContext,
    ) -> HandlerOutcome {
        let handler = match self.get(&parsed.name) {
            Some(command) => command.handler,
            None => match self.fallback {
                Some(fallback) => fallback,
                None => return HandlerOutcome::none(),
            },
        };
        handler(parsed, message, ctx).await
    }

    /// Routes a text message by its first token.
    pub async fn dispatch_text(
        &self,
        text: &str,
        message: &Message,
        ctx: &HandlerContext,
    ) -> HandlerOutcome {
        match parse_input(text) {
            InputType::Command(parsed) => self.execute(&parsed, message, ctx).await,
            InputType::Message => self.execute(&ParsedCommand::default(), message, ctx).await,
        }
    }

    #[cfg(test)]
    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
