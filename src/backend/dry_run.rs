use log::info;

use crate::backend::Connection;
use crate::error::Result;
use crate::types::OutputRecord;

/// Reads outputs from the wrapped connection but only prints commands.
///
/// Nothing is changed on the window manager side, so any state re-read after
/// a command (e.g. modes of an output that would have been enabled) is the
/// state from before it.
pub struct DryRunBackend<C> {
    inner: C,
}

impl<C: Connection> DryRunBackend<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Connection> Connection for DryRunBackend<C> {
    fn get_outputs(&self) -> Result<Vec<OutputRecord>> {
        self.inner.get_outputs()
    }

    fn command(&self, command: &str) -> Result<()> {
        info!("Dry run, not sending: {command}");
        println!("{command}");
        Ok(())
    }
}
