//! Error taxonomy for router construction, control actions, and transports.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to bind an input listening endpoint at startup. Fatal by contract:
/// callers are expected to exit non-zero rather than continue degraded.
#[derive(Debug)]
pub struct BindError {
    pub addr: String,
    pub source: std::io::Error,
}

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unable to bind input endpoint {}: {}", self.addr, self.source)
    }
}

impl Error for BindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Failures when constructing a [`Router`][crate::Router] from configuration.
#[derive(Debug, Eq, PartialEq)]
pub enum ConfigError {
    NoInputs,
    DuplicateInput(String),
    ZeroQueueSize,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoInputs => write!(f, "at least one input must be configured"),
            ConfigError::DuplicateInput(id) => {
                write!(f, "input id configured more than once: {id}")
            }
            ConfigError::ZeroQueueSize => {
                write!(f, "egress queue size must be at least 1")
            }
        }
    }
}

impl Error for ConfigError {}

/// Failures for the operator force control action.
///
/// Forcing a known-but-unavailable input is not an error; it is a legal pin
/// that leaves the router in the no-input state until the input recovers.
#[derive(Debug, Eq, PartialEq)]
pub enum ForceError {
    UnknownInput(String),
}

impl Display for ForceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ForceError::UnknownInput(id) => write!(f, "no such input: {id}"),
        }
    }
}

impl Error for ForceError {}

/// Failures surfaced by a sink's send path.
///
/// These never cross into router logic as errors; the egress worker logs
/// them and the connectivity flag carries the state.
#[derive(Debug)]
pub enum SinkSendError {
    NotConnected,
    Io(std::io::Error),
}

impl Display for SinkSendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkSendError::NotConnected => write!(f, "sink is not connected"),
            SinkSendError::Io(err) => write!(f, "sink transport error: {err}"),
        }
    }
}

impl Error for SinkSendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SinkSendError::Io(err) => Some(err),
            SinkSendError::NotConnected => None,
        }
    }
}
