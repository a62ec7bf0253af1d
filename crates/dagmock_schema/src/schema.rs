// SPDX-License-Identifier: MIT OR Apache-2.0
//! The schema: registered node types plus the default scene state.

use crate::attr_type::UnknownAttrType;
use crate::node_type::{NodeTypeDef, PortSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while building, loading or saving a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// File could not be read or written
    #[error("Schema I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON was malformed or did not match the schema shape
    #[error("Schema JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node type was registered twice
    #[error("Node type {0:?} is already registered")]
    DuplicateType(String),

    /// An attribute kind the host does not know
    #[error(transparent)]
    UnknownAttrType(#[from] UnknownAttrType),
}

/// Known node types and the nodes of an empty scene
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Node type definitions keyed by type name
    #[serde(default)]
    pub nodes: IndexMap<String, NodeTypeDef>,
    /// Nodes present in an empty scene: node name → node type
    #[serde(default)]
    pub default_state: IndexMap<String, String>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type.
    ///
    /// The type name is expected to be the leaf of the type's namespace; a
    /// mismatch is logged and the given name is kept.
    pub fn register_node(
        &mut self,
        node_type: impl Into<String>,
        def: NodeTypeDef,
    ) -> Result<(), SchemaError> {
        let node_type = node_type.into();
        if self.nodes.contains_key(&node_type) {
            return Err(SchemaError::DuplicateType(node_type));
        }
        if let Some(leaf) = def
            .namespace_type()
            .filter(|leaf| *leaf != node_type.as_str())
        {
            tracing::warn!(
                "Node type {:?} is registered under namespace leaf {:?}",
                node_type,
                leaf
            );
        }
        self.nodes.insert(node_type, def);
        Ok(())
    }

    /// Add a node to the default scene state
    pub fn with_default_node(
        mut self,
        name: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        self.default_state.insert(name.into(), node_type.into());
        self
    }

    /// Get the definition for a node type
    pub fn get(&self, node_type: &str) -> Option<&NodeTypeDef> {
        self.nodes.get(node_type)
    }

    /// Get the definition registered under a namespace
    pub fn get_by_namespace(&self, namespace: &str) -> Option<&NodeTypeDef> {
        self.nodes
            .values()
            .find(|def| def.namespace.as_deref() == Some(namespace))
    }

    /// Parent definition in the namespace hierarchy
    pub fn parent_of(&self, def: &NodeTypeDef) -> Option<&NodeTypeDef> {
        def.parent_namespace()
            .and_then(|namespace| self.get_by_namespace(namespace))
    }

    /// Classification reported for a node type
    pub fn classification(&self, node_type: &str) -> Option<&str> {
        self.get(node_type).map(|def| def.classification.as_str())
    }

    /// Every port a new node of `node_type` receives: inherited ports first,
    /// with a type's own declarations overriding its ancestors'.
    pub fn resolved_attributes(&self, node_type: &str) -> Option<IndexMap<String, PortSpec>> {
        let def = self.get(node_type)?;

        // Parent namespaces are strictly shorter, so the walk terminates.
        let mut chain = vec![def];
        let mut current = def;
        while let Some(parent) = self.parent_of(current) {
            chain.push(parent);
            current = parent;
        }

        let mut resolved = IndexMap::new();
        for def in chain.into_iter().rev() {
            for (name, spec) in &def.attributes {
                resolved.insert(name.clone(), spec.clone());
            }
        }
        Some(resolved)
    }

    // Serialization

    /// Parse a schema from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let schema: Self = serde_json::from_str(json)?;
        tracing::debug!(
            "Loaded schema with {} node types and {} default nodes",
            schema.nodes.len(),
            schema.default_state.len()
        );
        Ok(schema)
    }

    /// Serialize the schema to pretty JSON text
    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a schema from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        let schema = Self::from_json_str(&content)?;
        tracing::info!("Loaded schema from {:?}", path);
        Ok(schema)
    }

    /// Save the schema to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<(), SchemaError> {
        std::fs::write(path, self.to_json_string()?)?;
        tracing::info!("Saved schema to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_type::AttrType;

    fn sample_schema() -> Schema {
        let mut schema = Schema::new()
            .with_default_node("persp", "camera")
            .with_default_node("time1", "time");
        schema
            .register_node(
                "dagNode",
                NodeTypeDef::new("")
                    .with_namespace("containerBase.dagNode")
                    .with_attribute(
                        "visibility",
                        PortSpec::new(AttrType::Bool).with_short_name("v"),
                    )
                    .with_attribute("message", PortSpec::new(AttrType::Message))
                    .abstract_type(),
            )
            .unwrap();
        schema
            .register_node(
                "transform",
                NodeTypeDef::new("drawdb/geometry/transform")
                    .with_namespace("containerBase.dagNode.transform")
                    .with_attribute(
                        "translateX",
                        PortSpec::new(AttrType::DoubleLinear).with_short_name("tx"),
                    )
                    .with_attribute("message", PortSpec::new(AttrType::Generic)),
            )
            .unwrap();
        schema
    }

    #[test]
    fn test_duplicate_registration() {
        let mut schema = sample_schema();
        let result = schema.register_node("transform", NodeTypeDef::default());
        assert!(matches!(result, Err(SchemaError::DuplicateType(name)) if name == "transform"));
    }

    #[test]
    fn test_parent_lookup() {
        let schema = sample_schema();
        let transform = schema.get("transform").unwrap();
        let parent = schema.parent_of(transform).unwrap();
        assert_eq!(parent.namespace.as_deref(), Some("containerBase.dagNode"));
        assert!(schema.parent_of(parent).is_none());
    }

    #[test]
    fn test_resolved_attributes_inherit_and_override() {
        let schema = sample_schema();
        let attributes = schema.resolved_attributes("transform").unwrap();

        let names: Vec<_> = attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["visibility", "message", "translateX"]);
        // Own declaration wins over the inherited one
        assert_eq!(attributes["message"].port_type, AttrType::Generic);
        assert_eq!(attributes["visibility"].short_name.as_deref(), Some("v"));

        assert!(schema.resolved_attributes("unknown").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let schema = sample_schema();
        let json = schema.to_json_string().unwrap();
        let loaded = Schema::from_json_str(&json).unwrap();
        assert_eq!(loaded, schema);
        let keys: Vec<_> = loaded.default_state.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["persp", "time1"]);
    }

    #[test]
    fn test_load_documented_shape() {
        let json = r#"{
            "nodes": {
                "unitConversion": {
                    "attributes": {
                        "input": {"port_type": "generic", "short_name": "i", "nice_name": "Input",
                                  "parent": null, "readable": true, "writable": true},
                        "conversionFactor": {"port_type": "double", "short_name": "cf",
                                             "nice_name": "Conversion Factor", "parent": null,
                                             "readable": true, "writable": true}
                    },
                    "classification": "utility/general",
                    "abstract": false
                }
            },
            "default_state": {}
        }"#;
        let schema = Schema::from_json_str(json).unwrap();
        let def = schema.get("unitConversion").unwrap();
        assert_eq!(def.attributes.len(), 2);
        assert_eq!(def.attributes["conversionFactor"].port_type, AttrType::Double);
        assert_eq!(schema.classification("unitConversion"), Some("utility/general"));
    }

    #[test]
    fn test_unknown_port_type_is_rejected() {
        let json = r#"{"nodes": {"foo": {"attributes": {"bar": {"port_type": "quaternion"}}}}}"#;
        assert!(matches!(Schema::from_json_str(json), Err(SchemaError::Json(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");

        let schema = sample_schema();
        schema.to_json_file(&path).unwrap();
        let loaded = Schema::from_json_file(&path).unwrap();
        assert_eq!(loaded, schema);
    }
}
