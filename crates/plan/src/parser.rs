// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan file parsing.
//!
//! Line rules:
//! 1. Empty lines and `#` comments are skipped.
//! 2. A raw line ending in `\` folds into the next line (the backslash
//!    is replaced by a newline).
//! 3. Each remaining line splits once on the first space into a head and
//!    an argument string.
//! 4. The head is an optional modifier prefix (`*`, `^`, `$`, `&`)
//!    followed by a directive name from the directive table.

use crate::directive::{DirectiveKind, Instruction, Modifier};
use std::path::Path;
use thiserror::Error;

/// Errors from plan parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),
    #[error("invalid directive: {0}")]
    UnknownDirective(String),
    #[error("invalid modifier '{modifier}' for directive {directive}")]
    ForbiddenModifier { modifier: char, directive: DirectiveKind },
    #[error("unterminated multi-line command")]
    UnterminatedContinuation,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse a plan from a file on disk.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Instruction>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse a plan from source text.
pub fn parse_str(input: &str) -> Result<Vec<Instruction>, ParseError> {
    let mut instructions = Vec::new();
    let mut pending = String::new();

    for raw in input.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(stripped) = raw.strip_suffix('\\') {
            pending.push_str(stripped);
            pending.push('\n');
            continue;
        }
        let line = if pending.is_empty() {
            raw.to_string()
        } else {
            let mut folded = std::mem::take(&mut pending);
            folded.push_str(raw);
            folded
        };
        instructions.push(parse_line(&line)?);
    }

    if !pending.is_empty() {
        return Err(ParseError::UnterminatedContinuation);
    }
    Ok(instructions)
}

/// Parse one folded line into an instruction record.
fn parse_line(line: &str) -> Result<Instruction, ParseError> {
    let Some((head, rest)) = line.split_once(' ') else {
        return Err(ParseError::InvalidInstruction(line.to_string()));
    };

    let (modifier, name) = split_modifier(head);
    let Some(kind) = DirectiveKind::from_name(name) else {
        return Err(ParseError::UnknownDirective(head.to_string()));
    };
    if let Some(m) = modifier {
        if !kind.allowed_modifiers().contains(&m) {
            return Err(ParseError::ForbiddenModifier { modifier: m.as_char(), directive: kind });
        }
    }

    Ok(Instruction::new(kind, modifier, rest.trim()))
}

/// Split a modifier prefix off the head token.
///
/// A prefix only counts when the head is longer than one character, so a
/// bare `*` stays a (bad) directive name rather than an empty one.
fn split_modifier(head: &str) -> (Option<Modifier>, &str) {
    let mut chars = head.chars();
    match chars.next().and_then(Modifier::from_char) {
        Some(m) if head.len() > 1 => (Some(m), chars.as_str()),
        _ => (None, head),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
