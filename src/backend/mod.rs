use crate::error::Result;
use crate::types::OutputRecord;

/// The window manager IPC channel. Every call is a blocking round trip.
pub trait Connection {
    fn get_outputs(&self) -> Result<Vec<OutputRecord>>;
    fn command(&self, command: &str) -> Result<()>;
}

mod dry_run;
pub use dry_run::DryRunBackend;
mod swaymsg;
pub use swaymsg::SwaymsgBackend;
