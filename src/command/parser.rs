/// A command is named by its first token alone; anything after it is not
/// interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCommand {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputType {
    Command(ParsedCommand),
    Message,
}

pub fn parse_input(input: &str) -> InputType {
    let trimmed = input.trim();

    if trimmed.starts_with('/') {
        if let Some(parsed) = parse_command(trimmed) {
            return InputType::Command(parsed);
        }
    }

    InputType::Message
}

/// Only the first whitespace-delimited token names the command; a bare `/`
/// or `/ foo` is not a command.
fn parse_command(input: &str) -> Option<ParsedCommand> {
    let name = input.split_whitespace().next()?.strip_prefix('/')?;

    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name: name.to_string(),
    })
}
