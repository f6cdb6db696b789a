//! Line commands typed into the console client while in a game room.
//!
//! ```text
//! move 4 16          place a stone
//! start | undo | score | analysis
//! request undo       propose (start | undo | score)
//! accept undo        answer a proposal
//! reject score
//! hint               KataGo blue spot
//! estimate           KataGo score estimate
//! status             connection and pending proposals
//! leave
//! ```
//!
//! Anything that does not start with a known keyword is parsed as
//! [`ConsoleCommand::Unknown`] so the caller can print a usage hint.

use std::str::FromStr;

use baduk_protocol::Negotiable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Move { x: u8, y: u8 },
    Start,
    Undo,
    Score,
    Analysis,
    Request(Negotiable),
    Respond { kind: Negotiable, accepted: bool },
    Hint,
    Estimate,
    Status,
    Leave,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a board coordinate: {0}")]
    BadNumber(String),
    #[error("unknown proposal kind: {0} (expected start, undo or score)")]
    UnknownKind(String),
}

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err(ParseError::Empty);
        };
        let rest: Vec<&str> = words.collect();

        let command = match keyword.to_ascii_lowercase().as_str() {
            "move" | "m" => match rest.as_slice() {
                [x, y] => ConsoleCommand::Move {
                    x: parse_number(x)?,
                    y: parse_number(y)?,
                },
                _ => return Err(ParseError::Usage("move <x> <y>")),
            },
            "start" => ConsoleCommand::Start,
            "undo" => ConsoleCommand::Undo,
            "score" => ConsoleCommand::Score,
            "analysis" => ConsoleCommand::Analysis,
            "hint" => ConsoleCommand::Hint,
            "estimate" => ConsoleCommand::Estimate,
            "status" => ConsoleCommand::Status,
            "leave" => ConsoleCommand::Leave,
            "request" => ConsoleCommand::Request(single_kind(&rest, "request <kind>")?),
            "accept" => ConsoleCommand::Respond {
                kind: single_kind(&rest, "accept <kind>")?,
                accepted: true,
            },
            "reject" => ConsoleCommand::Respond {
                kind: single_kind(&rest, "reject <kind>")?,
                accepted: false,
            },
            _ => ConsoleCommand::Unknown(line.trim().to_string()),
        };
        Ok(command)
    }
}

// Range is checked by the game channel, which owns the board size rule.
fn parse_number(word: &str) -> Result<u8, ParseError> {
    word.parse()
        .map_err(|_| ParseError::BadNumber(word.to_string()))
}

fn single_kind(rest: &[&str], usage: &'static str) -> Result<Negotiable, ParseError> {
    let [word] = rest else {
        return Err(ParseError::Usage(usage));
    };
    Negotiable::ALL
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(word))
        .ok_or_else(|| ParseError::UnknownKind(word.to_string()))
}
