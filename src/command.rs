use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tally(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Please provide a positive number.")]
    InvalidAmount,
    #[error("Usage: {prefix}tally <positive number>")]
    MissingAmount { prefix: String },
}

/// Parses a chat message. `None` means the message is not addressed to the
/// bot. The command name must follow the prefix directly; it is matched
/// case-insensitively and trailing arguments after the amount are ignored.
pub fn parse_command(prefix: &str, content: &str) -> Option<Result<Command, CommandError>> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut words = rest.split_whitespace();
    let name = words.next()?;
    if !name.eq_ignore_ascii_case("tally") {
        return None;
    }

    let parsed = match words.next() {
        None => Err(CommandError::MissingAmount {
            prefix: prefix.to_string(),
        }),
        Some(arg) => match arg.parse::<i64>() {
            Ok(amount) if amount > 0 => Ok(Command::Tally(amount)),
            _ => Err(CommandError::InvalidAmount),
        },
    };
    Some(parsed)
}
