// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type definitions.

use crate::attr_type::AttrType;
use crate::namespace::{namespace_leaf, namespace_parent};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Definition of a default port created on every node of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    /// Declared attribute kind
    #[serde(default)]
    pub port_type: AttrType,
    /// Short alias (`tx` for `translateX`)
    #[serde(default)]
    pub short_name: Option<String>,
    /// Nice alias (`Translate X`)
    #[serde(default)]
    pub nice_name: Option<String>,
    /// Name of the compound parent attribute, if any
    #[serde(default)]
    pub parent: Option<String>,
    /// Whether the port can be read
    #[serde(default = "default_true")]
    pub readable: bool,
    /// Whether the port can be written
    #[serde(default = "default_true")]
    pub writable: bool,
}

impl PortSpec {
    /// Create a readable, writable port definition of the given kind
    pub fn new(port_type: AttrType) -> Self {
        Self {
            port_type,
            short_name: None,
            nice_name: None,
            parent: None,
            readable: true,
            writable: true,
        }
    }

    /// Set the short alias
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Set the nice alias
    pub fn with_nice_name(mut self, nice_name: impl Into<String>) -> Self {
        self.nice_name = Some(nice_name.into());
        self
    }

    /// Set the compound parent attribute
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        Self::new(AttrType::default())
    }
}

/// Everything the schema knows about one node type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTypeDef {
    /// Dotted inheritance path ending with the type itself,
    /// e.g. `containerBase.entity.dagNode.transform`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Ports declared by this type, excluding inherited ones
    #[serde(default)]
    pub attributes: IndexMap<String, PortSpec>,
    /// Host classification string
    #[serde(default)]
    pub classification: String,
    /// Abstract types cannot be instantiated by the host
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl NodeTypeDef {
    /// Create an empty definition
    pub fn new(classification: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            ..Default::default()
        }
    }

    /// Place the type in the namespace hierarchy
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Declare a port
    pub fn with_attribute(mut self, name: impl Into<String>, spec: PortSpec) -> Self {
        self.attributes.insert(name.into(), spec);
        self
    }

    /// Mark the type abstract
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Type name implied by the namespace leaf, if a namespace is set
    pub fn namespace_type(&self) -> Option<&str> {
        self.namespace.as_deref().map(namespace_leaf)
    }

    /// Namespace of the parent type, if any
    pub fn parent_namespace(&self) -> Option<&str> {
        self.namespace.as_deref().and_then(namespace_parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_spec_defaults_from_json() {
        let spec: PortSpec = serde_json::from_str(r#"{"port_type": "double"}"#).unwrap();
        assert_eq!(spec.port_type, AttrType::Double);
        assert!(spec.readable);
        assert!(spec.writable);
        assert!(spec.short_name.is_none());
    }

    #[test]
    fn test_namespace_accessors() {
        let def = NodeTypeDef::new("drawdb/geometry/transform")
            .with_namespace("containerBase.entity.dagNode.transform");
        assert_eq!(def.namespace_type(), Some("transform"));
        assert_eq!(def.parent_namespace(), Some("containerBase.entity.dagNode"));

        let root = NodeTypeDef::new("").with_namespace("containerBase");
        assert_eq!(root.parent_namespace(), None);
    }

    #[test]
    fn test_abstract_field_name() {
        let def = NodeTypeDef::new("").abstract_type();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["abstract"], serde_json::json!(true));
    }
}
