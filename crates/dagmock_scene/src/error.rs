// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session error type.
//!
//! Every error carries the offending pattern or path so a calling layer can
//! re-message it in host vocabulary. [`SessionError::kind`] groups variants
//! into the broad failure categories such a layer dispatches on.

use crate::node::NodeId;
use crate::port::PortId;
use dagmock_schema::SchemaError;
use std::fmt;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Which side of a connection a pattern was meant to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Port feeding the connection
    Source,
    /// Port fed by the connection
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Broad failure category of a [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Name has no legal characters
    InvalidName,
    /// Pattern or name matched nothing
    LookupFailure,
    /// Port kinds can never be connected
    IncompatiblePorts,
    /// Ports are already connected
    DuplicateConnection,
    /// Connection endpoint pattern matched nothing
    MissingEndpoint,
    /// Handle refers to an entity that no longer exists
    StaleHandle,
    /// Hierarchy or port layout would become inconsistent
    InvalidState,
    /// Schema could not be loaded
    Schema,
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Name sanitizes to nothing
    #[error("New name has no legal characters: {name:?}")]
    InvalidName {
        /// Name as supplied
        name: String,
    },

    /// Strict query found nothing
    #[error("No object matches name: {pattern}")]
    LookupFailure {
        /// Pattern as supplied
        pattern: String,
    },

    /// Port kinds declared mutually exclusive
    #[error("The attribute {src:?} cannot be connected to {dst:?}")]
    IncompatiblePorts {
        /// Source port path
        src: String,
        /// Destination port path
        dst: String,
    },

    /// The exact port pair is already connected
    #[error("{src:?} is already connected to {dst:?}")]
    DuplicateConnection {
        /// Source port path
        src: String,
        /// Destination port path
        dst: String,
    },

    /// The destination is already fed by another port
    #[error("{dst:?} already has an incoming connection from {existing:?}")]
    DestinationConnected {
        /// Destination port path
        dst: String,
        /// Path of the port currently feeding it
        existing: String,
    },

    /// A connection endpoint could not be resolved
    #[error("The {role} attribute {pattern:?} cannot be found")]
    MissingEndpoint {
        /// Side of the connection
        role: Endpoint,
        /// Pattern as supplied
        pattern: String,
    },

    /// Nothing connects the two ports
    #[error("There is no connection from {src:?} to {dst:?} to disconnect")]
    NoSuchConnection {
        /// Source port path
        src: String,
        /// Destination port path
        dst: String,
    },

    /// Node handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port handle does not refer to a live port
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// The node already has a port with this name
    #[error("Attribute already exists: {path:?}")]
    PortExists {
        /// Path of the existing port
        path: String,
    },

    /// Re-parenting would make a node its own ancestor
    #[error("Cannot parent {node:?} under {parent:?}: it would become its own ancestor")]
    ParentCycle {
        /// Path of the node being moved
        node: String,
        /// Path of the requested parent
        parent: String,
    },

    /// Pattern could not be compiled
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Schema failure
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl SessionError {
    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::LookupFailure { .. }
            | Self::NoSuchConnection { .. }
            | Self::InvalidPattern(_) => ErrorKind::LookupFailure,
            Self::IncompatiblePorts { .. } => ErrorKind::IncompatiblePorts,
            Self::DuplicateConnection { .. } | Self::DestinationConnected { .. } => {
                ErrorKind::DuplicateConnection
            }
            Self::MissingEndpoint { .. } => ErrorKind::MissingEndpoint,
            Self::NodeNotFound(_) | Self::PortNotFound(_) => ErrorKind::StaleHandle,
            Self::PortExists { .. } | Self::ParentCycle { .. } => ErrorKind::InvalidState,
            Self::Schema(_) => ErrorKind::Schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_detail() {
        let err = SessionError::IncompatiblePorts {
            src: "|A.c".to_string(),
            dst: "|B.s".to_string(),
        };
        assert_eq!(err.to_string(), r#"The attribute "|A.c" cannot be connected to "|B.s""#);
        assert_eq!(err.kind(), ErrorKind::IncompatiblePorts);

        let err = SessionError::MissingEndpoint {
            role: Endpoint::Destination,
            pattern: "A.missing".to_string(),
        };
        assert_eq!(err.to_string(), r#"The destination attribute "A.missing" cannot be found"#);
        assert_eq!(err.kind(), ErrorKind::MissingEndpoint);
    }

    #[test]
    fn test_lookup_failure_message() {
        let err = SessionError::LookupFailure {
            pattern: "ghost".to_string(),
        };
        assert_eq!(err.to_string(), "No object matches name: ghost");
        assert_eq!(err.kind(), ErrorKind::LookupFailure);
    }
}
