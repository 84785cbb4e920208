// Route description: the snack drop-off offset plus an ordered instruction
// sequence that fully defines one traversal, forward and reverse.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::config::MAX_INSTRUCTIONS;

/// One step of the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Drive forward the given number of centimetres.
    Drive(i32),
    /// Turn the given number of signed quarter turns.
    Turn(i32),
    /// Pause the route here and fulfil outstanding orders.
    Checkpoint,
}

/// Fixed offset from the path origin where the snack basket is replenished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dropoff {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub dropoff: Dropoff,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("failed to read route file: {0}")]
    Io(#[from] std::io::Error),

    #[error("route file is missing the drop-off offsets")]
    MissingDropoff,

    #[error("unknown instruction tag {0:?}")]
    UnknownTag(String),

    #[error("invalid number {value:?} for {what}")]
    BadValue { what: String, value: String },

    #[error("instruction tag {0:?} has no value")]
    MissingValue(String),
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl Route {
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parses the whitespace-separated route format: two leading drop-off
    /// offsets, then (tag, value) pairs with tag in {Move, Turn, X}. The value
    /// after an "X" tag is present but ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();

        let x = parse_number(tokens.next().ok_or(RouteError::MissingDropoff)?, "drop-off x")?;
        let y = parse_number(tokens.next().ok_or(RouteError::MissingDropoff)?, "drop-off y")?;

        let mut instructions = Vec::new();
        while let Some(tag) = tokens.next() {
            if instructions.len() == MAX_INSTRUCTIONS {
                warn!(max = MAX_INSTRUCTIONS, "route truncated at instruction limit");
                break;
            }
            let value = tokens
                .next()
                .ok_or_else(|| RouteError::MissingValue(tag.to_string()))?;
            let instruction = match tag {
                "Move" => Instruction::Drive(parse_number(value, tag)?),
                "Turn" => Instruction::Turn(parse_number(value, tag)?),
                "X" => Instruction::Checkpoint,
                _ => return Err(RouteError::UnknownTag(tag.to_string())),
            };
            instructions.push(instruction);
        }

        Ok(Self {
            dropoff: Dropoff { x, y },
            instructions,
        })
    }
}

fn parse_number(value: &str, what: &str) -> Result<i32> {
    value.parse().map_err(|_| RouteError::BadValue {
        what: what.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets_and_instructions() {
        let route = Route::parse("10 -20 Move 100 Turn -1 X 0 Move 50").unwrap();
        assert_eq!(route.dropoff, Dropoff { x: 10, y: -20 });
        assert_eq!(
            route.instructions,
            vec![
                Instruction::Drive(100),
                Instruction::Turn(-1),
                Instruction::Checkpoint,
                Instruction::Drive(50),
            ]
        );
    }

    #[test]
    fn empty_route_is_just_offsets() {
        let route = Route::parse("0 0").unwrap();
        assert!(route.instructions.is_empty());
    }

    #[test]
    fn missing_dropoff_is_rejected() {
        assert!(matches!(Route::parse(""), Err(RouteError::MissingDropoff)));
        assert!(matches!(Route::parse("10"), Err(RouteError::MissingDropoff)));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = Route::parse("0 0 Jump 10").unwrap_err();
        assert!(matches!(err, RouteError::UnknownTag(tag) if tag == "Jump"));
    }

    #[test]
    fn bad_value_is_rejected() {
        let err = Route::parse("0 0 Move fast").unwrap_err();
        assert!(matches!(err, RouteError::BadValue { .. }));
    }

    #[test]
    fn trailing_tag_without_value_is_rejected() {
        let err = Route::parse("0 0 Move 100 Turn").unwrap_err();
        assert!(matches!(err, RouteError::MissingValue(tag) if tag == "Turn"));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = Route::load(Path::new("no-such-route-file.txt")).unwrap_err();
        assert!(matches!(err, RouteError::Io(_)));
    }

    #[test]
    fn parse_stops_at_instruction_limit() {
        let mut text = String::from("0 0");
        for _ in 0..40 {
            text.push_str(" Move 10");
        }
        let route = Route::parse(&text).unwrap();
        assert_eq!(route.instructions.len(), MAX_INSTRUCTIONS);
    }
}
