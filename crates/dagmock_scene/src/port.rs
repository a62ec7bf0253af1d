// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ports (node attributes).

use crate::naming::{DagPattern, PORT_SEPARATOR};
use crate::node::NodeId;
use dagmock_schema::{AttrType, PortSpec};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Value stored in a port.
///
/// Values are not checked against the declared [`AttrType`]; any value can
/// be stored in any port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
    /// Fixed-size numeric tuple (`double3`, `float2`, ...)
    Vector(Vec<f64>),
    /// 4x4 matrix, row major
    Matrix([[f64; 4]; 4]),
    /// Array of strings
    StringArray(Vec<String>),
}

impl PortValue {
    /// Numeric view of scalar values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl Default for PortValue {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<bool> for PortValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PortValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PortValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for PortValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PortValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PortValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Everything needed to create a port besides its node and name
#[derive(Debug, Clone, PartialEq)]
pub struct PortOptions {
    /// Declared kind
    pub port_type: AttrType,
    /// Short alias, defaults to the name
    pub short_name: Option<String>,
    /// Nice alias, defaults to the name
    pub nice_name: Option<String>,
    /// Initial value
    pub value: PortValue,
    /// Whether the port can be read
    pub readable: bool,
    /// Whether the port can be written
    pub writable: bool,
    /// Whether the host lists the port by default
    pub interesting: bool,
    /// False for ports that come with the node type
    pub user_defined: bool,
    /// Compound parent attribute name
    pub parent: Option<String>,
}

impl Default for PortOptions {
    fn default() -> Self {
        Self {
            port_type: AttrType::default(),
            short_name: None,
            nice_name: None,
            value: PortValue::default(),
            readable: true,
            writable: true,
            interesting: true,
            user_defined: true,
            parent: None,
        }
    }
}

impl PortOptions {
    /// User-defined port of the given kind
    pub fn new(port_type: AttrType) -> Self {
        Self {
            port_type,
            ..Default::default()
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

    /// Set the initial value
    pub fn with_value(mut self, value: impl Into<PortValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the compound parent attribute
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Mark the port as coming with the node type
    pub fn schema_derived(mut self) -> Self {
        self.user_defined = false;
        self
    }
}

impl From<&PortSpec> for PortOptions {
    fn from(spec: &PortSpec) -> Self {
        Self {
            port_type: spec.port_type,
            short_name: spec.short_name.clone(),
            nice_name: spec.nice_name.clone(),
            readable: spec.readable,
            writable: spec.writable,
            parent: spec.parent.clone(),
            user_defined: false,
            ..Default::default()
        }
    }
}

/// A port on a node
#[derive(Debug, Clone)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    node: NodeId,
    name: String,
    short_name: String,
    nice_name: String,
    port_type: AttrType,
    /// Current value
    pub value: PortValue,
    /// Whether the port can be read
    pub readable: bool,
    /// Whether the port can be written
    pub writable: bool,
    /// Whether the host lists the port by default
    pub interesting: bool,
    user_defined: bool,
    parent: Option<String>,
}

impl Port {
    pub(crate) fn new(node: NodeId, name: impl Into<String>, options: PortOptions) -> Self {
        let name = name.into();
        let short_name = options
            .short_name
            .filter(|alias| !alias.is_empty())
            .unwrap_or_else(|| name.clone());
        let nice_name = options
            .nice_name
            .filter(|alias| !alias.is_empty())
            .unwrap_or_else(|| name.clone());
        Self {
            id: PortId::new(),
            node,
            name,
            short_name,
            nice_name,
            port_type: options.port_type,
            value: options.value,
            readable: options.readable,
            writable: options.writable,
            interesting: options.interesting,
            user_defined: options.user_defined,
            parent: options.parent,
        }
    }

    /// Owning node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Long name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short alias
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Nice alias
    pub fn nice_name(&self) -> &str {
        &self.nice_name
    }

    /// Declared kind
    pub fn port_type(&self) -> AttrType {
        self.port_type
    }

    /// False for ports created from the node type definition
    pub fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    /// Compound parent attribute name
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether `name` is this port's long, short or nice name
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.short_name == name || self.nice_name == name
    }

    /// `<node path>.<name>`
    pub fn path(&self, node_path: &str) -> String {
        format!("{node_path}{PORT_SEPARATOR}{}", self.name)
    }

    /// `<node path>.<short name>`
    pub fn short_path(&self, node_path: &str) -> String {
        format!("{node_path}{PORT_SEPARATOR}{}", self.short_name)
    }

    /// Whether the pattern designates this port, given its node's path
    pub fn matches(&self, pattern: &PortPattern, node_path: &str) -> bool {
        if pattern.is_empty() {
            return true;
        }
        if let Some(node_pattern) = &pattern.node {
            if !node_pattern.matches(node_path) {
                return false;
            }
        }
        pattern.matches_name(&self.name) || pattern.matches_name(&self.short_name)
    }
}

/// Compiled port pattern: `name`, `na*`, `node.name`, `|parent|node.na*`.
///
/// The attribute part is compared to the long and short names, exactly or
/// as a glob. The optional node part is a dag path pattern.
#[derive(Debug, Clone)]
pub struct PortPattern {
    node: Option<DagPattern>,
    attribute: String,
    glob: Option<glob::Pattern>,
}

impl PortPattern {
    /// Compile a pattern. `None` or an empty pattern matches every port.
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = pattern.unwrap_or_default();
        let (node, attribute) = match pattern.rsplit_once(PORT_SEPARATOR) {
            Some((node, attribute)) => (Some(DagPattern::new(Some(node))?), attribute),
            None => (None, pattern),
        };
        Ok(Self {
            node,
            attribute: attribute.to_string(),
            // Patterns that are not valid globs still match by equality
            glob: glob::Pattern::new(attribute).ok(),
        })
    }

    fn is_empty(&self) -> bool {
        self.node.is_none() && self.attribute.is_empty()
    }

    fn matches_name(&self, name: &str) -> bool {
        self.attribute == name || self.glob.as_ref().is_some_and(|glob| glob.matches(name))
    }
}
