// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes for command failures.
//!
//! A build can fail after its diagnostics were already streamed to
//! stdout, so commands distinguish "print this and exit" from "the
//! result stream said everything; just set the code". Returning an
//! `ExitError` instead of calling `std::process::exit()` keeps
//! termination in `main()`, after the sinks are drained and the worker
//! pool is stopped.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    code: i32,
    message: Option<String>,
}

impl ExitError {
    /// Fail with `code` after printing `message` to stderr.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: Some(message.into()) }
    }

    /// Fail with `code` only; the failure text already went out on the
    /// build's result stream.
    pub fn reported(code: i32) -> Self {
        Self { code, message: None }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => write!(f, "exit code {}", self.code),
        }
    }
}

impl std::error::Error for ExitError {}
