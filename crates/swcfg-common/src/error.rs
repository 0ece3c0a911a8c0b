//! Error types for connectivity manager operations.
//!
//! All errors implement `std::error::Error` via `thiserror`. Attribute lookup
//! misses are deliberately absent: an unset link attribute is an `Option`,
//! not a failure.

use std::io;
use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur during cfgmgr operations.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// An operation was invoked with no ports.
    #[error("Port list is empty")]
    EmptyPortList,

    /// A resolved resource path does not point at an interface.
    #[error("Interface was not found: '{path}'")]
    InterfaceNotFound {
        /// The path returned by the topology service.
        path: String,
    },

    /// Every port-channel id below the family ceiling is in use.
    #[error("Could not find available port channel (all ids below {max} are in use)")]
    PortChannelExhausted {
        /// The exclusive upper bound for port-channel ids.
        max: u32,
    },

    /// A port-channel reference does not carry a numeric id.
    #[error("Invalid port-channel reference '{reference}'")]
    InvalidPortChannel {
        /// The reference as supplied by the caller.
        reference: String,
    },

    /// A VLAN range could not be parsed or is out of bounds.
    #[error("Invalid VLAN range '{range}': {message}")]
    InvalidVlanRange {
        /// The range as supplied by the caller.
        range: String,
        /// Error message.
        message: String,
    },

    /// The topology service has no record of a resource.
    #[error("Resource '{name}' not found in topology")]
    ResourceNotFound {
        /// The resource name or path.
        name: String,
    },

    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// The device rejected a command sent over the session.
    #[error("Device rejected '{command}': {message}")]
    Session {
        /// The device command.
        command: String,
        /// Error message reported by the device.
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Reading a configuration or topology file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl CfgMgrError {
    /// Creates an interface not found error.
    pub fn interface_not_found(path: impl Into<String>) -> Self {
        Self::InterfaceNotFound { path: path.into() }
    }

    /// Creates a resource not found error.
    pub fn resource_not_found(name: impl Into<String>) -> Self {
        Self::ResourceNotFound { name: name.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid VLAN range error.
    pub fn invalid_vlan_range(range: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidVlanRange {
            range: range.into(),
            message: message.into(),
        }
    }

    /// Creates a session error.
    pub fn session(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error came from the transport rather than from
    /// reservation or device state.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CfgMgrError::ShellExec { .. }
                | CfgMgrError::ShellCommandFailed { .. }
                | CfgMgrError::Session { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CfgMgrError::interface_not_found("Ethernet1");
        assert_eq!(err.to_string(), "Interface was not found: 'Ethernet1'");
        assert_eq!(CfgMgrError::EmptyPortList.to_string(), "Port list is empty");
    }

    #[test]
    fn test_port_channel_exhausted() {
        let err = CfgMgrError::PortChannelExhausted { max: 65 };
        assert!(err.to_string().contains("below 65"));
    }

    #[test]
    fn test_shell_command_failed() {
        let err = CfgMgrError::ShellCommandFailed {
            command: "vsh -c \"show running-config\"".to_string(),
            exit_code: 2,
            output: "Permission denied".to_string(),
        };
        assert!(err.to_string().contains("show running-config"));
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_is_transport() {
        assert!(CfgMgrError::session("speed 1000", "Invalid command").is_transport());
        assert!(!CfgMgrError::EmptyPortList.is_transport());
        assert!(!CfgMgrError::PortChannelExhausted { max: 4095 }.is_transport());
    }
}
