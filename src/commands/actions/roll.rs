//! Dice roll command handler.
//!
//! Expressions use dice notation. A term is either dice,
//! `[rolls]d<faces>[*multiplier]`, or a constant modifier. Terms are linked
//! with `+` or `-`, e.g. `2d6+d12-3`. Several expressions can be rolled at
//! once, each one gets its own line.

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::{
    commands::{CommandResult, responses::format_error},
    pagination::Document,
};

/// Most dice a single term may roll.
pub const MAX_DICE: u32 = 1000;

/// Invalid dice expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Missing delimiter before `{0}`")]
    MissingDelimiter(String),
    #[error("Invalid roll count: `{count}` at start of `{rest}`")]
    InvalidRollCount { count: String, rest: String },
    #[error("Invalid face count: `{faces}` at start of `{rest}`")]
    InvalidFaceCount { faces: String, rest: String },
    #[error("Cannot match dice term at start of `{0}`")]
    UnmatchedTerm(String),
    #[error("Number too large at start of `{0}`")]
    TooLarge(String),
}

/// One signed term of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Dice { rolls: u32, faces: u32, multiplier: i64 },
    Constant(i64),
}

/// Rolls every expression and formats one line per expression.
pub fn handle_roll(expressions: &[String]) -> CommandResult {
    debug!("handling roll command: {:?}", expressions);

    match roll_all(expressions, &mut rand::thread_rng()) {
        Ok(text) => CommandResult::reply(Document::new().body(text)),
        Err(e) => CommandResult::reply(format_error("Invalid dice expression", &e.to_string())),
    }
}

/// Rolls `expressions` with `rng`.
///
/// Each line reads `` `expression` → total ``. Several lines are introduced
/// by `Rolls:`.
fn roll_all<R: Rng>(expressions: &[String], rng: &mut R) -> Result<String, DiceError> {
    let mut lines = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let terms = parse_expression(expression)?;
        let total = evaluate(&terms, rng).ok_or_else(|| DiceError::TooLarge(expression.clone()))?;
        lines.push(format!("`{}` → {}", expression, total));
    }

    if lines.len() > 1 {
        Ok(format!("Rolls:\n{}", lines.join("\n")))
    } else {
        Ok(lines.join("\n"))
    }
}

fn parse_expression(expression: &str) -> Result<Vec<Term>, DiceError> {
    let mut terms = Vec::new();
    let mut remaining = expression;
    let mut first = true;

    while !remaining.is_empty() {
        let mut sign = 1;
        if let Some(rest) = remaining.strip_prefix('+') {
            remaining = rest;
        } else if let Some(rest) = remaining.strip_prefix('-') {
            sign = -1;
            remaining = rest;
        } else if !first {
            return Err(DiceError::MissingDelimiter(remaining.to_owned()));
        }
        first = false;

        let (count, after_count) = take_digits(remaining);
        let (term, rest) = match after_count.strip_prefix('d') {
            Some(after_d) if after_d.starts_with(|c: char| c.is_ascii_digit()) => {
                let (faces, after_faces) = take_digits(after_d);
                let rolls = if count.is_empty() {
                    1
                } else {
                    parse_number(count, remaining)?
                };
                if rolls < 1 {
                    return Err(DiceError::InvalidRollCount {
                        count: count.to_owned(),
                        rest: remaining.to_owned(),
                    });
                }
                if rolls > MAX_DICE {
                    return Err(DiceError::TooLarge(remaining.to_owned()));
                }
                let face_count = parse_number(faces, remaining)?;
                if face_count < 2 {
                    return Err(DiceError::InvalidFaceCount {
                        faces: faces.to_owned(),
                        rest: remaining.to_owned(),
                    });
                }

                // A `*` without digits is left for the next term to reject
                let (multiplier, rest) = match after_faces.strip_prefix('*') {
                    Some(after_star) if after_star.starts_with(|c: char| c.is_ascii_digit()) => {
                        let (digits, rest) = take_digits(after_star);
                        (parse_number(digits, remaining)?, rest)
                    }
                    _ => (1, after_faces),
                };

                let term = Term::Dice {
                    rolls,
                    faces: face_count,
                    multiplier: sign * i64::from(multiplier),
                };
                (term, rest)
            }
            _ if !count.is_empty() => {
                let constant = parse_number(count, remaining)?;
                (Term::Constant(sign * i64::from(constant)), after_count)
            }
            _ => return Err(DiceError::UnmatchedTerm(remaining.to_owned())),
        };

        terms.push(term);
        remaining = rest;
    }

    Ok(terms)
}

/// Sums the terms, `None` when the total does not fit in an `i64`.
fn evaluate<R: Rng>(terms: &[Term], rng: &mut R) -> Option<i64> {
    terms.iter().try_fold(0i64, |total, term| {
        let value = match *term {
            Term::Dice {
                rolls,
                faces,
                multiplier,
            } => {
                let sum = (0..rolls)
                    .try_fold(0i64, |sum, _| sum.checked_add(i64::from(rng.gen_range(1..=faces))))?;
                sum.checked_mul(multiplier)?
            }
            Term::Constant(value) => value,
        };
        total.checked_add(value)
    })
}

/// Splits the leading ASCII digits off `text`.
fn take_digits(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(end)
}

fn parse_number(digits: &str, rest: &str) -> Result<u32, DiceError> {
    digits
        .parse::<u32>()
        .map_err(|_| DiceError::TooLarge(rest.to_owned()))
}
