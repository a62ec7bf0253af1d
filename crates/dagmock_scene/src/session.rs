// SPDX-License-Identifier: MIT OR Apache-2.0
//! The scene session: every node, port and connection of a mocked scene.
//!
//! Entities are stored in arenas keyed by id. Dag paths are computed from
//! the parent chain on demand. Mutations log through `tracing` and notify the
//! session's [`Observers`] synchronously.

use crate::config::HostRules;
use crate::connection::{Connection, ConnectionOutcome};
use crate::error::{Endpoint, Result, SessionError};
use crate::events::{EventKind, Observers, SessionEvent};
use crate::naming::{self, DagPattern, PATH_SEPARATOR};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortId, PortOptions, PortPattern, PortValue};
use crate::selection::{SelectMode, Selection};
use dagmock_schema::{AttrType, Schema};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

/// What a pattern resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A node
    Node(NodeId),
    /// A port
    Port(PortId),
}

/// In-memory scene
#[derive(Debug)]
pub struct Session {
    nodes: IndexMap<NodeId, Node>,
    /// Removed nodes that orphaned children still point at
    retired: IndexMap<NodeId, Node>,
    ports: IndexMap<PortId, Port>,
    ports_by_node: IndexMap<NodeId, IndexSet<PortId>>,
    connections: IndexSet<Connection>,
    selection: Selection,
    schema: Option<Schema>,
    rules: HostRules,
    observers: Rc<Observers>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn qualify(parent_path: &str, name: &str) -> String {
    format!("{parent_path}{PATH_SEPARATOR}{name}")
}

impl Session {
    /// Create an empty session with the default host rules
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            retired: IndexMap::new(),
            ports: IndexMap::new(),
            ports_by_node: IndexMap::new(),
            connections: IndexSet::new(),
            selection: Selection::new(),
            schema: None,
            rules: HostRules::default(),
            observers: Observers::new(),
        }
    }

    /// Replace the host rules
    pub fn with_config(mut self, rules: HostRules) -> Self {
        self.rules = rules;
        self
    }

    /// Attach a schema and create its default scene state.
    ///
    /// Default nodes are created with the rules in effect at this point, so
    /// call [`Session::with_config`] first.
    pub fn with_schema(mut self, schema: Schema) -> Result<Self> {
        let defaults: Vec<(String, String)> = schema
            .default_state
            .iter()
            .map(|(name, node_type)| (name.clone(), node_type.clone()))
            .collect();
        self.schema = Some(schema);

        for (name, node_type) in defaults {
            self.create_node(&node_type, Some(&name), None)?;
        }
        Ok(self)
    }

    /// Load a JSON schema file and attach it, see [`Session::with_schema`]
    pub fn with_schema_file(self, path: &Path) -> Result<Self> {
        let schema = Schema::from_json_file(path)?;
        self.with_schema(schema)
    }

    /// Host rules in effect
    pub fn rules(&self) -> &HostRules {
        &self.rules
    }

    /// Attached schema, if any
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Shared handle to the observer list
    pub fn observers(&self) -> Rc<Observers> {
        Rc::clone(&self.observers)
    }

    fn emit(&self, kind: EventKind, build: impl FnOnce(&Self) -> SessionEvent) {
        if self.observers.wants(kind) {
            let event = build(self);
            self.observers.emit(&event);
        }
    }

    // Nodes

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All live nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn live_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(SessionError::NodeNotFound(id))
    }

    /// Live or retired node
    fn node_record(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).or_else(|| self.retired.get(&id))
    }

    fn node_record_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.nodes.get_mut(&id) {
            Some(node) => Some(node),
            None => self.retired.get_mut(&id),
        }
    }

    fn path_of(&self, node: &Node) -> String {
        let mut segments = vec![node.name()];
        let mut cursor = node.parent();
        while let Some(parent) = cursor.and_then(|id| self.node_record(id)) {
            segments.push(parent.name());
            cursor = parent.parent();
        }

        let mut path = String::new();
        for segment in segments.iter().rev() {
            path.push(PATH_SEPARATOR);
            path.push_str(segment);
        }
        path
    }

    /// Absolute dag path of a node
    pub fn node_path(&self, id: NodeId) -> Result<String> {
        Ok(self.path_of(self.live_node(id)?))
    }

    /// Shortest identifier that designates only this node.
    ///
    /// The bare name is used unless another node also matches it, in which
    /// case ancestor names are prepended one at a time. A node still
    /// ambiguous at the root gets its absolute path.
    pub fn display_name(&self, id: NodeId) -> Result<String> {
        let node = self.live_node(id)?;
        let mut pattern = node.name().to_string();
        let mut cursor = node;
        while self.is_pattern_clashing(id, &pattern)? {
            match cursor.parent().and_then(|parent| self.node_record(parent)) {
                Some(parent) => {
                    pattern = naming::join(parent.name(), &pattern);
                    cursor = parent;
                }
                None => {
                    pattern.insert(0, PATH_SEPARATOR);
                    break;
                }
            }
        }
        Ok(pattern)
    }

    /// Parent of a node, `None` at the root
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.live_node(id)?.parent())
    }

    /// Direct children of a node
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.live_node(id)?.children().collect())
    }

    /// Whether nodes of this type are created under a transform.
    ///
    /// The transform type itself is never a shape.
    pub fn is_shape_type(&self, node_type: &str) -> bool {
        if node_type == self.rules.transform_type {
            return false;
        }
        self.rules.is_shape_type(node_type)
            || self
                .schema
                .as_ref()
                .and_then(|schema| schema.classification(node_type))
                .is_some_and(|classification| self.rules.is_shape_classification(classification))
    }

    /// Whether a node is a shape
    pub fn is_shape(&self, id: NodeId) -> Result<bool> {
        Ok(self.is_shape_type(self.live_node(id)?.node_type()))
    }

    /// Whether any node matches the pattern
    pub fn node_exists(&self, pattern: &str) -> Result<bool> {
        Ok(self.node_by_match(Some(pattern), false)?.is_some())
    }

    /// First node, in creation order, with exactly this name
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.name() == name)
            .map(|node| node.id)
    }

    /// Nodes whose path matches the pattern, sorted by path.
    ///
    /// In strict mode an empty result is a lookup failure.
    pub fn nodes_by_match(&self, pattern: Option<&str>, strict: bool) -> Result<Vec<NodeId>> {
        let predicate = DagPattern::new(pattern)?;
        let mut matched: Vec<(String, NodeId)> = self
            .nodes
            .values()
            .filter_map(|node| {
                let path = self.path_of(node);
                predicate.matches(&path).then_some((path, node.id))
            })
            .collect();
        matched.sort_by(|a, b| a.0.cmp(&b.0));

        if strict && matched.is_empty() {
            return Err(SessionError::LookupFailure {
                pattern: pattern.unwrap_or_default().to_string(),
            });
        }
        Ok(matched.into_iter().map(|(_, id)| id).collect())
    }

    /// First node, by path, matching the pattern
    pub fn node_by_match(&self, pattern: Option<&str>, strict: bool) -> Result<Option<NodeId>> {
        Ok(self.nodes_by_match(pattern, strict)?.into_iter().next())
    }

    /// Whether a node other than `id` matches `candidate`
    pub fn is_pattern_clashing(&self, id: NodeId, candidate: &str) -> Result<bool> {
        let predicate = DagPattern::new(Some(candidate))?;
        Ok(self
            .nodes
            .values()
            .any(|node| node.id != id && predicate.matches(&self.path_of(node))))
    }

    fn taken_paths(&self, exclude: Option<NodeId>) -> HashSet<String> {
        self.nodes
            .values()
            .filter(|node| Some(node.id) != exclude)
            .map(|node| self.path_of(node))
            .collect()
    }

    /// `prefix1`, `prefix2`, ...: the first legal name free under `parent_path`
    fn unique_name(&self, prefix: &str, parent_path: &str, taken: &HashSet<String>) -> String {
        let mut index: u64 = 1;
        loop {
            let name = format!("{prefix}{index}");
            if self.rules.is_valid_name(&name) && !taken.contains(&qualify(parent_path, &name)) {
                return name;
            }
            index += 1;
        }
    }

    /// Keep a requested name if it is legal and free, otherwise suffix it
    fn settle_name(
        &self,
        requested: String,
        parent_path: &str,
        taken: &HashSet<String>,
    ) -> String {
        if self.rules.is_valid_name(&requested)
            && !taken.contains(&qualify(parent_path, &requested))
        {
            return requested;
        }
        self.unique_name(naming::strip_trailing_digits(&requested), parent_path, taken)
    }

    fn conform_name(&self, name: &str) -> Result<String> {
        let conformed = naming::sanitize(name);
        if conformed.is_empty() {
            return Err(SessionError::InvalidName {
                name: name.to_string(),
            });
        }
        if conformed != name {
            tracing::warn!("Removing invalid characters from name {:?}", name);
        }
        Ok(conformed)
    }

    fn parent_path(&self, parent: Option<NodeId>) -> Result<String> {
        match parent {
            Some(parent) => self.node_path(parent),
            None => Ok(String::new()),
        }
    }

    /// Create a node.
    ///
    /// Shape types created without a parent get a generated transform
    /// parent. A requested name is sanitized, and suffixed with the first
    /// free number when it is reserved or its path is taken. Without a name
    /// the node is named after its type. Ports declared by the schema for
    /// the type are created on the new node.
    pub fn create_node(
        &mut self,
        node_type: &str,
        name: Option<&str>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let requested = name.map(|name| self.conform_name(name)).transpose()?;
        if let Some(parent) = parent {
            self.live_node(parent)?;
        }
        let shape = self.is_shape_type(node_type);

        let parent = match parent {
            Some(parent) => Some(parent),
            None if shape => {
                let prefix = self.rules.shape_prefix(node_type).to_string();
                let transform_name = self.unique_name(&prefix, "", &self.taken_paths(None));
                let transform_type = self.rules.transform_type.clone();
                Some(self.create_node(&transform_type, Some(&transform_name), None)?)
            }
            None => None,
        };

        let parent_path = self.parent_path(parent)?;
        let taken = self.taken_paths(None);
        let name = match requested {
            Some(requested) => self.settle_name(requested, &parent_path, &taken),
            None => {
                let prefix = if shape {
                    format!("{}Shape", self.rules.shape_prefix(node_type))
                } else {
                    node_type.to_string()
                };
                self.unique_name(&prefix, &parent_path, &taken)
            }
        };

        let mut node = Node::new(node_type, name);
        let id = node.id;
        if let Some(parent) = parent {
            node.set_parent_link(Some(parent));
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.attach_child(id);
            }
        }
        self.nodes.insert(id, node);
        self.ports_by_node.insert(id, IndexSet::new());

        let path = qualify(&parent_path, self.nodes[&id].name());
        tracing::debug!("Created {} node {}", node_type, path);
        self.emit(EventKind::NodeAdded, |_| SessionEvent::NodeAdded { node: id, path });

        self.apply_node_type(id, node_type)?;
        Ok(id)
    }

    fn apply_node_type(&mut self, node: NodeId, node_type: &str) -> Result<()> {
        let Some(attributes) = self
            .schema
            .as_ref()
            .and_then(|schema| schema.resolved_attributes(node_type))
        else {
            return Ok(());
        };

        for (name, spec) in &attributes {
            self.create_port(node, name, PortOptions::from(spec))?;
        }
        Ok(())
    }

    /// Remove a node and its ports.
    ///
    /// Children are not removed: they keep pointing at the removed node,
    /// which therefore still appears in their paths until they are
    /// re-parented.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let path = self.node_path(id)?;
        let ports: Vec<PortId> = self
            .ports_by_node
            .get(&id)
            .map(|ports| ports.iter().copied().collect())
            .unwrap_or_default();
        for port in ports {
            self.remove_port(port)?;
        }

        self.emit(EventKind::NodeRemoved, |_| SessionEvent::NodeRemoved {
            node: id,
            path: path.clone(),
        });

        self.ports_by_node.shift_remove(&id);
        self.selection.remove(&id);
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(SessionError::NodeNotFound(id))?;
        if let Some(parent) = node.parent().and_then(|parent| self.node_record_mut(parent)) {
            parent.detach_child(id);
        }
        if node.has_children() {
            self.retired.insert(id, node);
        }
        self.prune_retired();

        tracing::debug!("Removed node {}", path);
        Ok(())
    }

    /// Forget removed nodes that no live or retained node points at
    fn prune_retired(&mut self) {
        loop {
            let referenced: HashSet<NodeId> = self
                .nodes
                .values()
                .chain(self.retired.values())
                .filter_map(Node::parent)
                .collect();
            let before = self.retired.len();
            self.retired.retain(|id, _| referenced.contains(id));
            if self.retired.len() == before {
                break;
            }
        }
    }

    /// Rename a node. Returns the name actually applied.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<String> {
        let conformed = self.conform_name(name)?;
        let parent_path = self.parent_path(self.live_node(id)?.parent())?;
        let taken = self.taken_paths(Some(id));
        let applied = self.settle_name(conformed, &parent_path, &taken);

        if let Some(node) = self.nodes.get_mut(&id) {
            tracing::debug!("Renamed {} to {}", node.name(), applied);
            node.set_name(applied.clone());
        }
        Ok(applied)
    }

    /// Move a node under `parent`, or to the root with `None`.
    ///
    /// Fails if the node would become its own ancestor.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        let old_parent = self.live_node(id)?.parent();
        if let Some(parent) = parent {
            self.live_node(parent)?;
            if self.is_ancestor(id, parent) {
                return Err(SessionError::ParentCycle {
                    node: self.node_path(id)?,
                    parent: self.node_path(parent)?,
                });
            }
        }

        if let Some(old) = old_parent.and_then(|old| self.node_record_mut(old)) {
            old.detach_child(id);
        }
        if let Some(new) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            new.attach_child(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_parent_link(parent);
        }
        self.prune_retired();
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node_record(current).and_then(Node::parent);
        }
        false
    }

    // Selection

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Combine nodes with the selection
    pub fn select(&mut self, nodes: &[NodeId], mode: SelectMode) -> Result<()> {
        for id in nodes {
            self.live_node(*id)?;
        }
        self.selection.apply(nodes, mode);
        Ok(())
    }

    /// Deselect everything
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // Ports

    /// Get a port by ID
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, id: PortId) -> Option<&mut Port> {
        self.ports.get_mut(&id)
    }

    /// All live ports in creation order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Ports of a node in creation order
    pub fn node_ports(&self, node: NodeId) -> impl Iterator<Item = &Port> {
        self.ports_by_node
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.ports.get(id))
    }

    fn live_port(&self, id: PortId) -> Result<&Port> {
        self.ports.get(&id).ok_or(SessionError::PortNotFound(id))
    }

    fn port_node_path(&self, port: &Port) -> Result<String> {
        self.node_record(port.node())
            .map(|node| self.path_of(node))
            .ok_or(SessionError::NodeNotFound(port.node()))
    }

    /// `<node path>.<port name>`
    pub fn port_path(&self, id: PortId) -> Result<String> {
        let port = self.live_port(id)?;
        Ok(port.path(&self.port_node_path(port)?))
    }

    /// `<node path>.<short name>`
    pub fn port_short_path(&self, id: PortId) -> Result<String> {
        let port = self.live_port(id)?;
        Ok(port.short_path(&self.port_node_path(port)?))
    }

    /// `<node display name>.<port name>`
    pub fn port_display_name(&self, id: PortId) -> Result<String> {
        let port = self.live_port(id)?;
        Ok(format!(
            "{}{}{}",
            self.display_name(port.node())?,
            naming::PORT_SEPARATOR,
            port.name()
        ))
    }

    /// Add a port to a node
    pub fn create_port(
        &mut self,
        node: NodeId,
        name: &str,
        options: PortOptions,
    ) -> Result<PortId> {
        let node_path = self.node_path(node)?;
        if name.is_empty() {
            return Err(SessionError::InvalidName {
                name: name.to_string(),
            });
        }
        if let Some(existing) = self.node_ports(node).find(|port| port.name() == name) {
            return Err(SessionError::PortExists {
                path: existing.path(&node_path),
            });
        }

        let port = Port::new(node, name, options);
        let id = port.id;
        let path = port.path(&node_path);
        self.ports.insert(id, port);
        self.ports_by_node.entry(node).or_default().insert(id);

        tracing::debug!("Created port {}", path);
        self.emit(EventKind::PortAdded, |_| SessionEvent::PortAdded {
            port: id,
            node,
            path,
        });
        Ok(id)
    }

    /// Remove a port and every connection using it
    pub fn remove_port(&mut self, id: PortId) -> Result<()> {
        let path = self.port_path(id)?;
        let node = self.live_port(id)?.node();
        let connections: Vec<Connection> = self
            .connections
            .iter()
            .filter(|connection| connection.involves_port(id))
            .copied()
            .collect();
        for connection in connections {
            self.remove_connection(connection)?;
        }

        self.emit(EventKind::PortRemoved, |_| SessionEvent::PortRemoved {
            port: id,
            node,
            path: path.clone(),
        });
        self.ports.shift_remove(&id);
        if let Some(ports) = self.ports_by_node.get_mut(&node) {
            ports.shift_remove(&id);
        }
        tracing::debug!("Removed port {}", path);
        Ok(())
    }

    /// Port of a node answering to a long, short or nice name
    pub fn node_port_by_name(&self, node: NodeId, name: &str) -> Option<PortId> {
        self.node_ports(node)
            .find(|port| port.answers_to(name))
            .map(|port| port.id)
    }

    /// Like [`Session::node_port_by_name`], failing when nothing answers
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<PortId> {
        let node_path = self.node_path(node)?;
        self.node_port_by_name(node, name)
            .ok_or_else(|| SessionError::LookupFailure {
                pattern: format!("{node_path}{}{name}", naming::PORT_SEPARATOR),
            })
    }

    /// Remove the port of a node answering to `name`
    pub fn remove_node_port(&mut self, node: NodeId, name: &str) -> Result<()> {
        let port = self.attribute(node, name)?;
        self.remove_port(port)
    }

    /// Store a value in a port
    pub fn set_port_value(&mut self, id: PortId, value: impl Into<PortValue>) -> Result<()> {
        let port = self.ports.get_mut(&id).ok_or(SessionError::PortNotFound(id))?;
        port.value = value.into();
        Ok(())
    }

    /// First port, in creation order, matching the pattern
    pub fn port_by_match(&self, pattern: Option<&str>) -> Result<Option<PortId>> {
        let pattern = PortPattern::new(pattern)?;
        Ok(self
            .ports
            .values()
            .find(|port| {
                self.port_node_path(port)
                    .is_ok_and(|node_path| port.matches(&pattern, &node_path))
            })
            .map(|port| port.id))
    }

    /// Like [`Session::port_by_match`], failing when nothing matches
    pub fn find_port(&self, pattern: &str) -> Result<PortId> {
        self.port_by_match(Some(pattern))?
            .ok_or_else(|| SessionError::LookupFailure {
                pattern: pattern.to_string(),
            })
    }

    /// Resolve a pattern to a port, or else to a node
    pub fn resolve(&self, pattern: &str) -> Result<Entity> {
        if let Some(port) = self.port_by_match(Some(pattern))? {
            return Ok(Entity::Port(port));
        }
        if let Some(node) = self.node_by_match(Some(pattern), false)? {
            return Ok(Entity::Node(node));
        }
        Err(SessionError::LookupFailure {
            pattern: pattern.to_string(),
        })
    }

    // Connections

    /// Connect two ports.
    ///
    /// Kinds that can never be connected are rejected. Kinds that need a
    /// conversion are linked through a new conversion node instead of
    /// directly. An existing identical connection is left as is.
    pub fn create_connection(&mut self, src: PortId, dst: PortId) -> Result<ConnectionOutcome> {
        let src_type = self.live_port(src)?.port_type();
        let dst_type = self.live_port(dst)?.port_type();

        if self.rules.is_impossible(src_type, dst_type) {
            return Err(SessionError::IncompatiblePorts {
                src: self.port_path(src)?,
                dst: self.port_path(dst)?,
            });
        }
        if let Some(factor) = self.rules.conversion_factor(src_type, dst_type) {
            return self.insert_conversion(src, dst, factor);
        }
        Ok(ConnectionOutcome::Direct(self.insert_connection(src, dst)))
    }

    fn insert_conversion(
        &mut self,
        src: PortId,
        dst: PortId,
        factor: f64,
    ) -> Result<ConnectionOutcome> {
        let node_type = self.rules.conversion_node_type.clone();
        let node = self.create_node(&node_type, None, None)?;
        let input = self.ensure_port(node, "input", AttrType::Generic)?;
        let output = self.ensure_port(node, "output", AttrType::Generic)?;
        let factor_port = self.ensure_port(node, "conversionFactor", AttrType::Double)?;
        self.set_port_value(factor_port, factor)?;

        tracing::debug!(
            "Converting {} to {} through {} (factor {})",
            self.port_path(src)?,
            self.port_path(dst)?,
            self.node_path(node)?,
            factor
        );
        let input = self.insert_connection(src, input);
        let output = self.insert_connection(output, dst);
        Ok(ConnectionOutcome::Converted {
            node,
            input,
            output,
        })
    }

    /// Port named `name`, created if the schema did not declare it
    fn ensure_port(&mut self, node: NodeId, name: &str, port_type: AttrType) -> Result<PortId> {
        match self.node_port_by_name(node, name) {
            Some(port) => Ok(port),
            None => self.create_port(node, name, PortOptions::new(port_type).schema_derived()),
        }
    }

    fn insert_connection(&mut self, src: PortId, dst: PortId) -> Connection {
        let connection = Connection::new(src, dst);
        if self.connections.insert(connection) {
            tracing::debug!("Connected {:?}", connection);
            self.emit(EventKind::ConnectionAdded, |session| {
                SessionEvent::ConnectionAdded {
                    connection,
                    src: session.port_path(src).unwrap_or_default(),
                    dst: session.port_path(dst).unwrap_or_default(),
                }
            });
        }
        connection
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection: Connection) -> Result<()> {
        if !self.connections.contains(&connection) {
            return Err(SessionError::NoSuchConnection {
                src: self.port_path(connection.src)?,
                dst: self.port_path(connection.dst)?,
            });
        }
        self.emit(EventKind::ConnectionRemoved, |session| {
            SessionEvent::ConnectionRemoved {
                connection,
                src: session.port_path(connection.src).unwrap_or_default(),
                dst: session.port_path(connection.dst).unwrap_or_default(),
            }
        });
        self.connections.shift_remove(&connection);
        tracing::debug!("Disconnected {:?}", connection);
        Ok(())
    }

    fn endpoint(&self, pattern: &str, role: Endpoint) -> Result<PortId> {
        self.port_by_match(Some(pattern))?
            .ok_or_else(|| SessionError::MissingEndpoint {
                role,
                pattern: pattern.to_string(),
            })
    }

    /// Connect two ports designated by patterns.
    ///
    /// The exact pair must not be connected already. A destination fed by
    /// another port is an error unless `force` is set, in which case its
    /// incoming connections are replaced.
    pub fn connect(
        &mut self,
        src_pattern: &str,
        dst_pattern: &str,
        force: bool,
    ) -> Result<ConnectionOutcome> {
        let src = self.endpoint(src_pattern, Endpoint::Source)?;
        let dst = self.endpoint(dst_pattern, Endpoint::Destination)?;

        if self.connection_by_ports(src, dst).is_some() {
            return Err(SessionError::DuplicateConnection {
                src: self.port_path(src)?,
                dst: self.port_path(dst)?,
            });
        }

        let incoming = self.input_connections(dst);
        if let Some(existing) = incoming.first() {
            if !force {
                return Err(SessionError::DestinationConnected {
                    dst: self.port_path(dst)?,
                    existing: self.port_path(existing.src)?,
                });
            }
            for connection in incoming {
                self.remove_connection(connection)?;
            }
        }

        self.create_connection(src, dst)
    }

    /// Disconnect two ports designated by patterns
    pub fn disconnect(&mut self, src_pattern: &str, dst_pattern: &str) -> Result<()> {
        let src = self.endpoint(src_pattern, Endpoint::Source)?;
        let dst = self.endpoint(dst_pattern, Endpoint::Destination)?;
        let connection = self.connection_by_ports(src, dst).ok_or_else(|| {
            SessionError::NoSuchConnection {
                src: self.port_path(src).unwrap_or_else(|_| src_pattern.to_string()),
                dst: self.port_path(dst).unwrap_or_else(|_| dst_pattern.to_string()),
            }
        })?;
        self.remove_connection(connection)
    }

    /// The connection from `src` to `dst`, if any
    pub fn connection_by_ports(&self, src: PortId, dst: PortId) -> Option<Connection> {
        let connection = Connection::new(src, dst);
        self.connections.contains(&connection).then_some(connection)
    }

    /// All connections in creation order
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.connections.iter().copied()
    }

    /// Both port paths concatenated: the value a connection is equal by
    pub fn connection_key(&self, connection: Connection) -> Result<String> {
        Ok(format!(
            "{}{}",
            self.port_path(connection.src)?,
            self.port_path(connection.dst)?
        ))
    }

    /// Whether the port feeds any connection
    pub fn port_is_source(&self, port: PortId) -> bool {
        self.connections.iter().any(|connection| connection.src == port)
    }

    /// Whether the port is fed by any connection
    pub fn port_is_destination(&self, port: PortId) -> bool {
        self.connections.iter().any(|connection| connection.dst == port)
    }

    /// Connections feeding the port
    pub fn input_connections(&self, port: PortId) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|connection| connection.dst == port)
            .copied()
            .collect()
    }

    /// Connections fed by the port
    pub fn output_connections(&self, port: PortId) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|connection| connection.src == port)
            .copied()
            .collect()
    }

    /// Ports feeding the port
    pub fn inputs(&self, port: PortId) -> Vec<PortId> {
        self.input_connections(port)
            .into_iter()
            .map(|connection| connection.src)
            .collect()
    }

    /// Ports fed by the port
    pub fn outputs(&self, port: PortId) -> Vec<PortId> {
        self.output_connections(port)
            .into_iter()
            .map(|connection| connection.dst)
            .collect()
    }
}
