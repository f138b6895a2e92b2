use log::debug;
use serde::Deserialize;

use crate::backend::Connection;
use crate::error::{Error, Result};
use crate::types::OutputRecord;

/// Talks to sway through its `swaymsg` client.
pub struct SwaymsgBackend {
    executable: String,
}

impl SwaymsgBackend {
    pub fn new(executable: String) -> Self {
        Self { executable }
    }
}

impl Connection for SwaymsgBackend {
    fn get_outputs(&self) -> Result<Vec<OutputRecord>> {
        let output = std::process::Command::new(&self.executable)
            .arg("-r")
            .arg("-t")
            .arg("get_outputs")
            .output()?;
        if !output.status.success() {
            return Err(Error::Connection(format!(
                "{} get_outputs failed: {}",
                self.executable,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn command(&self, command: &str) -> Result<()> {
        let mut cmd = std::process::Command::new(&self.executable);
        cmd.arg("-r").arg("--").arg(command);

        debug!("Executing {:?}", cmd);
        let output = cmd.output()?;

        // swaymsg exits non-zero when sway rejects a command but still prints
        // the reply, so look at the reply first.
        match serde_json::from_slice::<Vec<CommandReply>>(&output.stdout) {
            Ok(replies) => check_replies(command, replies),
            Err(_) if !output.status.success() => Err(Error::Connection(format!(
                "{} failed: {}",
                self.executable,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn check_replies(command: &str, replies: Vec<CommandReply>) -> Result<()> {
    match replies.into_iter().find(|reply| !reply.success) {
        Some(reply) => Err(Error::Command {
            command: command.to_string(),
            message: reply.error.unwrap_or_else(|| "unknown error".to_string()),
        }),
        None => Ok(()),
    }
}
