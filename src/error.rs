use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    // Monitor lookup
    #[error("Monitor is ambiguous: {predicate} matches {matches} monitors")]
    AmbiguousMonitor { predicate: String, matches: usize },
    #[error("Could not find monitor matching {predicate}")]
    MonitorNotFound { predicate: String },

    // Mode lookup
    #[error("Mode {width}x{height} is ambiguous on {monitor}")]
    AmbiguousMonitorMode {
        monitor: String,
        width: i32,
        height: i32,
    },
    #[error("Monitor {monitor} has no mode {width}x{height}")]
    MonitorModeNotFound {
        monitor: String,
        width: i32,
        height: i32,
    },

    #[error("Specified background does not exist: {}", .0.display())]
    BackgroundNotFound(PathBuf),
    #[error("Monitor {0} has no modes")]
    NoModes(String),
    #[error("Monitor {0} does not fit in the layout coordinate range")]
    LayoutOverflow(String),

    // Window manager IPC
    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
