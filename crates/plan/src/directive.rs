// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directive names, modifier prefixes, and the parsed instruction record.

use std::fmt;

/// One recognized directive name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Bind a build variable: `ARG KEY=VALUE`
    Arg,
    /// Bind an environment variable for spawned commands: `ENV KEY=VALUE`
    Env,
    /// Execute a validated shell command: `RUN <command>`
    Run,
    /// Deferred terminal command, at most one per plan: `CMD <command>`
    Cmd,
    /// Create a directory: `DIR <path>`
    Dir,
    /// Copy a file or directory tree: `CPY <src> <dst>`
    Cpy,
    /// Change the build working directory: `WDR <path>`
    Wdr,
    /// Run a nested sub-build: `SUB <file>`
    Sub,
    /// Include a sub-plan synchronously: `FRM <file>`
    Frm,
    /// Locate a plugin under ./plugins: `JET <name>`
    Jet,
    /// Format a string: `FMT <format> <args...>`
    Fmt,
    /// Register a container image: `BOX <name> <repo> <tag>`
    Box,
    /// Execute a command inside a registered box: `USE <name> <command>`
    Use,
}

/// All recognized directives, in plan-file documentation order.
pub const ALL_DIRECTIVES: &[DirectiveKind] = &[
    DirectiveKind::Arg,
    DirectiveKind::Env,
    DirectiveKind::Run,
    DirectiveKind::Cmd,
    DirectiveKind::Dir,
    DirectiveKind::Cpy,
    DirectiveKind::Wdr,
    DirectiveKind::Sub,
    DirectiveKind::Frm,
    DirectiveKind::Jet,
    DirectiveKind::Fmt,
    DirectiveKind::Box,
    DirectiveKind::Use,
];

impl DirectiveKind {
    /// Look up a directive by its plan-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ARG" => Some(Self::Arg),
            "ENV" => Some(Self::Env),
            "RUN" => Some(Self::Run),
            "CMD" => Some(Self::Cmd),
            "DIR" => Some(Self::Dir),
            "CPY" => Some(Self::Cpy),
            "WDR" => Some(Self::Wdr),
            "SUB" => Some(Self::Sub),
            "FRM" => Some(Self::Frm),
            "JET" => Some(Self::Jet),
            "FMT" => Some(Self::Fmt),
            "BOX" => Some(Self::Box),
            "USE" => Some(Self::Use),
            _ => None,
        }
    }

    /// The plan-file name of this directive.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arg => "ARG",
            Self::Env => "ENV",
            Self::Run => "RUN",
            Self::Cmd => "CMD",
            Self::Dir => "DIR",
            Self::Cpy => "CPY",
            Self::Wdr => "WDR",
            Self::Sub => "SUB",
            Self::Frm => "FRM",
            Self::Jet => "JET",
            Self::Fmt => "FMT",
            Self::Box => "BOX",
            Self::Use => "USE",
        }
    }

    /// Modifier prefixes this directive accepts.
    pub fn allowed_modifiers(&self) -> &'static [Modifier] {
        match self {
            Self::Run | Self::Cpy | Self::Sub => &[Modifier::Star],
            Self::Fmt => &[Modifier::Caret, Modifier::Dollar, Modifier::Amp],
            _ => &[],
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single-character prefix selecting a directive variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `*` — run asynchronously alongside sibling directives
    Star,
    /// `^` — redirect formatted output to a file
    Caret,
    /// `$` — export formatted output to the build environment
    Dollar,
    /// `&` — export formatted output to a build variable
    Amp,
}

impl Modifier {
    /// Parse a modifier from its prefix character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Star),
            '^' => Some(Self::Caret),
            '$' => Some(Self::Dollar),
            '&' => Some(Self::Amp),
            _ => None,
        }
    }

    /// The prefix character of this modifier.
    pub fn as_char(&self) -> char {
        match self {
            Self::Star => '*',
            Self::Caret => '^',
            Self::Dollar => '$',
            Self::Amp => '&',
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One parsed directive record. Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub kind: DirectiveKind,
    pub modifier: Option<Modifier>,
    /// Raw remainder of the source line, surrounding whitespace trimmed.
    /// Variable expansion is applied per-directive at execution time.
    pub args: String,
}

impl Instruction {
    pub fn new(kind: DirectiveKind, modifier: Option<Modifier>, args: impl Into<String>) -> Self {
        Self { kind, modifier, args: args.into() }
    }

    /// True when this record carries the `*` asynchronous modifier.
    pub fn is_async(&self) -> bool {
        self.modifier == Some(Modifier::Star)
    }

    /// Render the record back to plan-file form: `prefix+name SP args`.
    pub fn render(&self) -> String {
        match self.modifier {
            Some(m) => format!("{}{} {}", m.as_char(), self.kind.name(), self.args),
            None => format!("{} {}", self.kind.name(), self.args),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;
