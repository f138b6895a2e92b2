//! Scripted connection used by unit tests.

use std::cell::RefCell;

use crate::backend::Connection;
use crate::error::{Error, Result};
use crate::types::OutputRecord;

pub(crate) fn fixture_outputs() -> Vec<OutputRecord> {
    serde_json::from_str(include_str!("../testdata/get_outputs.json"))
        .expect("fixture is valid get_outputs JSON")
}

/// Serves `get_outputs` from the fixture (or whatever was set) and records
/// every command it receives.
pub(crate) struct FakeConnection {
    outputs: RefCell<Vec<OutputRecord>>,
    commands: RefCell<Vec<String>>,
    fail_on: Option<String>,
}

impl FakeConnection {
    pub(crate) fn new() -> Self {
        Self {
            outputs: RefCell::new(fixture_outputs()),
            commands: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Rejects `command` (after recording it), the way sway rejects an
    /// output it cannot configure.
    pub(crate) fn failing_on(mut self, command: &str) -> Self {
        self.fail_on = Some(command.to_string());
        self
    }

    pub(crate) fn set_outputs(&self, outputs: Vec<OutputRecord>) {
        *self.outputs.borrow_mut() = outputs;
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl Connection for FakeConnection {
    fn get_outputs(&self) -> Result<Vec<OutputRecord>> {
        Ok(self.outputs.borrow().clone())
    }

    fn command(&self, command: &str) -> Result<()> {
        self.commands.borrow_mut().push(command.to_string());
        if self.fail_on.as_deref() == Some(command) {
            return Err(Error::Command {
                command: command.to_string(),
                message: "rejected by test".to_string(),
            });
        }
        Ok(())
    }
}
