/*!
 * Command Parsing
 * Turns script lines into scheduler requests
 *
 * Format: one command per line, an optional leading `&` to run in the
 * background, then a command name and whitespace-separated arguments.
 * Blank lines and `#` comments are skipped.
 */

use super::types::{ItemClass, Payload};
use crate::core::errors::CommandError;
use crate::core::types::{Ticks, WorkId};

/// Leading marker requesting background execution
pub const BACKGROUND_MARKER: char = '&';

/// Leading marker for comment lines
pub const COMMENT_MARKER: char = '#';

const SLEEP_USAGE: &str = "sleep <id> <ticks>";

/// A parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit new work
    Submit { class: ItemClass, payload: Payload },
    /// Put ready work to sleep
    Sleep { id: WorkId, ticks: Ticks },
}

impl Command {
    /// Parse one line; `Ok(None)` for blank and comment lines
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return Ok(None);
        }

        let (class, rest) = match line.strip_prefix(BACKGROUND_MARKER) {
            Some(rest) => (ItemClass::Background, rest),
            None => (ItemClass::Foreground, line),
        };

        let mut words = rest.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        if verb == "sleep" {
            if class == ItemClass::Background {
                return Err(CommandError::NotBackgroundable(verb.to_string()));
            }
            return parse_sleep(verb, &args).map(Some);
        }

        Ok(Some(Self::Submit {
            class,
            payload: Payload::new(verb).with_args(args),
        }))
    }
}

fn parse_sleep(verb: &str, args: &[&str]) -> Result<Command, CommandError> {
    match args {
        [id, ticks] => Ok(Command::Sleep {
            id: parse_number(id)?,
            ticks: parse_number(ticks)?,
        }),
        [] | [_] => Err(CommandError::MissingArguments {
            verb: verb.to_string(),
            usage: SLEEP_USAGE,
        }),
        _ => Err(CommandError::TooManyArguments {
            verb: verb.to_string(),
            expected: 2,
        }),
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse().map_err(|_| CommandError::InvalidNumber {
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_command() {
        let cmd = Command::parse("echo hello world").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Submit {
                class: ItemClass::Foreground,
                payload: Payload::new("echo").with_args(["hello", "world"]),
            }
        );
    }

    #[test]
    fn test_background_marker() {
        let cmd = Command::parse("  & add 1   2 ").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Submit {
                class: ItemClass::Background,
                payload: Payload::new("add").with_args(["1", "2"]),
            }
        );

        let cmd = Command::parse("&fib 10").unwrap().unwrap();
        assert!(matches!(cmd, Command::Submit { class: ItemClass::Background, .. }));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# setup").unwrap(), None);
    }

    #[test]
    fn test_marker_without_command() {
        assert_eq!(Command::parse("&").unwrap_err(), CommandError::Empty);
        assert_eq!(Command::parse("&   ").unwrap_err(), CommandError::Empty);
    }

    #[test]
    fn test_sleep_command() {
        assert_eq!(
            Command::parse("sleep 3 5").unwrap(),
            Some(Command::Sleep { id: 3, ticks: 5 })
        );
        // Zero is left for the scheduler to reject
        assert_eq!(
            Command::parse("sleep 3 0").unwrap(),
            Some(Command::Sleep { id: 3, ticks: 0 })
        );
    }

    #[test]
    fn test_sleep_errors() {
        assert!(matches!(
            Command::parse("sleep 3"),
            Err(CommandError::MissingArguments { .. })
        ));
        assert!(matches!(
            Command::parse("sleep 1 2 3"),
            Err(CommandError::TooManyArguments { expected: 2, .. })
        ));
        assert_eq!(
            Command::parse("sleep x 2").unwrap_err(),
            CommandError::InvalidNumber { value: "x".to_string() }
        );
        assert!(matches!(
            Command::parse("sleep 1 -2"),
            Err(CommandError::InvalidNumber { .. })
        ));
        assert_eq!(
            Command::parse("&sleep 1 2").unwrap_err(),
            CommandError::NotBackgroundable("sleep".to_string())
        );
    }
}
