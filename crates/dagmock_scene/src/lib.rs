// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scene graph session for dagmock.
//!
//! This crate mocks the scene graph of a 3D animation host well enough to
//! unit test tools written against its scripting API:
//! - Nodes with dag paths, parenting and host-style auto naming
//! - Typed ports with long, short and nice names
//! - Connections, including the conversion nodes the host inserts
//! - Pattern queries with the host's partial dag path matching
//! - Change notifications for test observers
//!
//! ```
//! use dagmock_scene::Session;
//!
//! let mut session = Session::new();
//! let shape = session.create_node("mesh", Some("body"), None).unwrap();
//! assert_eq!(session.node_path(shape).unwrap(), "|polySurface1|body");
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod naming;
pub mod node;
pub mod port;
pub mod selection;
pub mod session;

pub use config::{ConfigError, ConversionRule, HostRules};
pub use connection::{Connection, ConnectionOutcome};
pub use error::{Endpoint, ErrorKind, Result, SessionError};
pub use events::{EventKind, Observers, SessionEvent, SubscriptionId};
pub use node::{Node, NodeId};
pub use port::{Port, PortId, PortOptions, PortPattern, PortValue};
pub use selection::{SelectMode, Selection};
pub use session::{Entity, Session};

pub use dagmock_schema::{AttrType, NodeTypeDef, PortSpec, Schema, SchemaError};
