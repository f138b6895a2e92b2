//! Arrange sway outputs from declarative setups.
//!
//! Monitors are identified by stable metadata (model, serial, ...) through
//! [`Predicate`]s rather than by connector name. A [`MonitorRegistry`]
//! resolves an ordered list of predicates and lays the matching monitors out
//! in a single row or column, disabling every other active output.

pub mod apply;
pub mod backend;
pub mod config;
pub mod error;
pub mod monitor;
pub mod predicate;
pub mod registry;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use monitor::Monitor;
pub use predicate::{Predicate, PropertyValue};
pub use registry::MonitorRegistry;
pub use types::{Alignment, Background, BackgroundSizing, Direction, DisplayMode, Position};
