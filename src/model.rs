use eframe::egui::Pos2;
use std::fmt;

// ------------------------------------------------------------------
// Identifiers
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EdgeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ------------------------------------------------------------------
// Nodes and edges
// ------------------------------------------------------------------

/// Closed set of node kinds. Each kind maps to one drawing strategy in
/// `block_shape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    #[default]
    StyledBlock,
}

/// A positioned, labelled block. `position` is the top-left corner in
/// canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Pos2,
    pub label: String,
    pub kind: NodeKind,
    pub selected: bool,
}

impl Node {
    pub fn block(
        id: impl Into<NodeId>,
        position: Pos2,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
            kind: NodeKind::StyledBlock,
            selected: false,
        }
    }
}

/// Directed link between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub selected: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            selected: false,
        }
    }
}
