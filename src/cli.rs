//! Line commands understood by the interactive harness.

use thiserror::Error;

use crate::policy::{DistanceUnit, UnknownDistanceUnit};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the rate text. `rate` alone clears the field.
    Rate(String),
    /// A key press in the rate field, by key name (e.g. `ArrowLeft`).
    Key(String),
    Unit(DistanceUnit),
    Offline,
    Online,
    Show,
    Errors,
    Clear,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Unit(#[from] UnknownDistanceUnit),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (name, rest) = match line.trim_start().split_once(' ') {
            Some((name, rest)) => (name, rest),
            None => (line.trim_start(), ""),
        };

        match name {
            "" => Err(CommandError::Empty),
            // The rate text is kept verbatim so invalid input reaches the grammar.
            "rate" => Ok(Command::Rate(rest.to_string())),
            "key" => match rest.trim() {
                "" => Err(CommandError::MissingArgument("key")),
                key => Ok(Command::Key(key.to_string())),
            },
            "unit" => match rest.trim() {
                "" => Err(CommandError::MissingArgument("unit")),
                unit => Ok(Command::Unit(unit.parse()?)),
            },
            "offline" => Ok(Command::Offline),
            "online" => Ok(Command::Online),
            "show" => Ok(Command::Show),
            "errors" => Ok(Command::Errors),
            "clear" => Ok(Command::Clear),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rate_keeps_text_verbatim() {
        assert_eq!(
            Command::parse("rate 1.2a").unwrap(),
            Command::Rate("1.2a".to_string())
        );
        assert_eq!(Command::parse("rate").unwrap(), Command::Rate(String::new()));
    }

    #[test]
    fn parse_unit() {
        assert_eq!(
            Command::parse("unit km").unwrap(),
            Command::Unit(DistanceUnit::Kilometers)
        );
        assert!(matches!(
            Command::parse("unit furlongs"),
            Err(CommandError::Unit(_))
        ));
        assert!(matches!(
            Command::parse("unit"),
            Err(CommandError::MissingArgument("unit"))
        ));
    }

    #[test]
    fn parse_key_and_flags() {
        assert_eq!(
            Command::parse("key ArrowLeft").unwrap(),
            Command::Key("ArrowLeft".to_string())
        );
        assert_eq!(Command::parse("offline").unwrap(), Command::Offline);
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn parse_rejects_unknown_and_empty() {
        assert!(matches!(Command::parse(""), Err(CommandError::Empty)));
        assert!(matches!(
            Command::parse("dance"),
            Err(CommandError::Unknown(_))
        ));
    }
}
