//! Recording runner for unit tests

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::Result;

use super::{CommandInvocation, CommandOutcome, CommandRunner};

type Responder = Box<dyn Fn(&CommandInvocation) -> Result<CommandOutcome>>;

/// Records every invocation and answers with `responder`.
///
/// For compiler invocations carrying `-o <path>`, a successful answer also
/// writes a placeholder binary to `<path>`, the way `go build` would.
pub(crate) struct FakeRunner {
    pub calls: RefCell<Vec<CommandInvocation>>,
    responder: Responder,
}

impl FakeRunner {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CommandInvocation) -> Result<CommandOutcome> + 'static,
    {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(|_| Ok(exit(0)))
    }

    /// Rendered `program args...` of each call, in order
    pub fn rendered(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.to_string()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutcome> {
        self.calls.borrow_mut().push(invocation.clone());
        let outcome = (self.responder)(invocation)?;
        if outcome.success() {
            if let Some(pos) = invocation.args.iter().position(|a| a == "-o") {
                if let Some(out) = invocation.args.get(pos + 1) {
                    std::fs::write(PathBuf::from(out), b"#!/bin/sh\nexit 0\n")?;
                }
            }
        }
        Ok(outcome)
    }
}

pub(crate) fn exit(code: i32) -> CommandOutcome {
    CommandOutcome {
        code: Some(code),
        ..Default::default()
    }
}
