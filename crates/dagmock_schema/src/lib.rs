// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node-type catalog consumed by the dagmock scene session.
//!
//! A [`Schema`] describes, for every known node type:
//! - the default ports created alongside a new node of that type
//! - the classification string reported by the host
//! - its place in the type namespace hierarchy (ports are inherited)
//!
//! It also lists the nodes present in an empty scene (`default_state`).
//!
//! ## Data shape
//!
//! Schemas round-trip losslessly through JSON:
//!
//! ```json
//! {
//!   "nodes": {
//!     "transform": {
//!       "namespace": "containerBase.entity.dagNode.transform",
//!       "attributes": {
//!         "translateX": {
//!           "port_type": "doubleLinear",
//!           "short_name": "tx",
//!           "nice_name": "Translate X"
//!         }
//!       },
//!       "classification": "drawdb/geometry/transform",
//!       "abstract": false
//!     }
//!   },
//!   "default_state": { "persp": "camera" }
//! }
//! ```

pub mod attr_type;
pub mod namespace;
pub mod node_type;
pub mod schema;

pub use attr_type::AttrType;
pub use namespace::{namespace_leaf, namespace_parent};
pub use node_type::{NodeTypeDef, PortSpec};
pub use schema::{Schema, SchemaError};
