// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connections between ports.

use crate::node::NodeId;
use crate::port::PortId;
use serde::{Deserialize, Serialize};

/// A directed link from a source port to a destination port.
///
/// Ports are unique per node and name, so the id pair stands for the pair of
/// port paths: two connections over the same ports are the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Port feeding the connection
    pub src: PortId,
    /// Port fed by the connection
    pub dst: PortId,
}

impl Connection {
    /// Create a connection between two ports
    pub fn new(src: PortId, dst: PortId) -> Self {
        Self { src, dst }
    }

    /// Check if this connection involves a specific port
    pub fn involves_port(&self, port: PortId) -> bool {
        self.src == port || self.dst == port
    }
}

/// Result of [`Session::create_connection`](crate::Session::create_connection)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The two ports were linked directly
    Direct(Connection),
    /// A conversion node was inserted between the two ports
    Converted {
        /// The synthesized conversion node
        node: NodeId,
        /// Source port → conversion input
        input: Connection,
        /// Conversion output → destination port
        output: Connection,
    },
}

impl ConnectionOutcome {
    /// The direct connection, `None` when the link goes through a conversion node
    pub fn connection(&self) -> Option<Connection> {
        match self {
            Self::Direct(connection) => Some(*connection),
            Self::Converted { .. } => None,
        }
    }

    /// The synthesized conversion node, if any
    pub fn conversion_node(&self) -> Option<NodeId> {
        match self {
            Self::Direct(_) => None,
            Self::Converted { node, .. } => Some(*node),
        }
    }
}
