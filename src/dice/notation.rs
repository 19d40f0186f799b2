//! Dice notation parser
//!
//! Grammar: `[count] d faces [(+|-) modifier]`, e.g. `2d8+2`, `d20`, `3D6-1`.
//! The `d` is case-insensitive; no whitespace is accepted anywhere.

use std::str::FromStr;

use thiserror::Error;

use crate::dice::types::DiceDescriptor;

/// Why a notation string could not be turned into a [`DiceDescriptor`].
///
/// Callers must refuse to roll on any of these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("empty dice notation")]
    Empty,
    #[error("invalid dice notation '{input}', use a format like '2d6+1' or 'd20'")]
    Malformed { input: String },
    #[error("number out of range in dice notation '{input}'")]
    OutOfRange { input: String },
    #[error("dice count must be at least 1")]
    ZeroCount,
    #[error("dice need at least one face")]
    ZeroFaces,
    #[error("cannot roll {count} dice at once (max {max})")]
    TooManyDice { count: u32, max: u32 },
}

/// Parse a dice expression into a descriptor.
pub fn parse_notation(input: &str) -> Result<DiceDescriptor, ParseFailure> {
    if input.is_empty() {
        return Err(ParseFailure::Empty);
    }
    let malformed = || ParseFailure::Malformed {
        input: input.to_string(),
    };

    let Some(d_pos) = input.find(|c: char| c == 'd' || c == 'D') else {
        return Err(malformed());
    };
    let count_str = &input[..d_pos];
    let rest = &input[d_pos + 1..];

    let count = if count_str.is_empty() {
        1
    } else {
        parse_digits(count_str, input)?
    };

    let (faces_str, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
        Some(sign_pos) => {
            let magnitude = parse_digits(&rest[sign_pos + 1..], input)?;
            let magnitude = i64::from(magnitude);
            let modifier = if rest.as_bytes()[sign_pos] == b'-' {
                -magnitude
            } else {
                magnitude
            };
            (&rest[..sign_pos], modifier)
        }
        None => (rest, 0),
    };
    let faces = parse_digits(faces_str, input)?;

    DiceDescriptor::new(count, faces, modifier)
}

/// Parse a non-empty run of ASCII digits.
fn parse_digits(digits: &str, input: &str) -> Result<u32, ParseFailure> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseFailure::Malformed {
            input: input.to_string(),
        });
    }
    digits.parse::<u32>().map_err(|_| ParseFailure::OutOfRange {
        input: input.to_string(),
    })
}

impl FromStr for DiceDescriptor {
    type Err = ParseFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_notation(s)
    }
}
