//! Device command session contract.
//!
//! Managers never talk to a transport directly: they issue exec-mode and
//! config-mode commands through a [`CommandSession`] and get raw text back.
//! Commands are awaited one at a time, so a session always sees a strict
//! request/response sequence.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CfgMgrError, CfgMgrResult};
use crate::shell;

/// Marker the device CLI prints when it rejects a command.
const CLI_ERROR_MARKER: &str = "% Invalid";

/// A command/response session to one device.
#[async_trait]
pub trait CommandSession: Send {
    /// Issues an exec-mode command (`show ...`) and returns its raw output.
    async fn send_command(&mut self, command: &str) -> CfgMgrResult<String>;

    /// Issues a config-mode command and returns its raw output.
    ///
    /// `interface <name>` enters that interface's context; subsequent
    /// commands apply to it until another context is entered.
    async fn send_config_command(&mut self, command: &str) -> CfgMgrResult<String>;
}

/// Session that reaches the device CLI through a local wrapper program.
///
/// Each command runs as `<program> -c "<command>"`. Config-mode commands are
/// prefixed with `configure terminal` and the current interface context, so
/// the context survives across separate wrapper invocations.
#[derive(Debug, Clone)]
pub struct ShellSession {
    program: String,
    context: Option<String>,
}

impl ShellSession {
    /// Creates a session using the given wrapper program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            context: None,
        }
    }

    /// Creates a session through the NX-OS virtual shell.
    pub fn vsh() -> Self {
        Self::new(shell::VSH_CMD)
    }

    /// Returns the interface context config commands currently apply to.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn config_script(&mut self, command: &str) -> String {
        if command.starts_with("interface ") {
            self.context = Some(command.to_string());
            return format!("configure terminal ; {}", command);
        }
        if command.starts_with("no interface ") {
            self.context = None;
            return format!("configure terminal ; {}", command);
        }
        match &self.context {
            Some(ctx) => format!("configure terminal ; {} ; {}", ctx, command),
            None => format!("configure terminal ; {}", command),
        }
    }

    async fn run(&self, device_command: &str, script: &str) -> CfgMgrResult<String> {
        let cmd = format!("{} -c {}", self.program, shell::shellquote(script));
        let output = shell::exec_or_throw(&cmd).await?;
        if let Some(line) = output.lines().find(|l| l.contains(CLI_ERROR_MARKER)) {
            return Err(CfgMgrError::session(device_command, line.trim()));
        }
        Ok(output)
    }
}

#[async_trait]
impl CommandSession for ShellSession {
    async fn send_command(&mut self, command: &str) -> CfgMgrResult<String> {
        debug!(command = %command, "send_command");
        self.run(command, command).await
    }

    async fn send_config_command(&mut self, command: &str) -> CfgMgrResult<String> {
        debug!(command = %command, context = ?self.context, "send_config_command");
        let script = self.config_script(command);
        self.run(command, &script).await
    }
}
