//! Incremental change descriptors emitted by the render layer, and the
//! pure functions that fold them into the node and edge collections.

use crate::model::{Edge, EdgeId, Node, NodeId};
use eframe::egui::Pos2;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// Append a node at the end of the collection
    Add(Node),
    /// Remove the node with this id
    Remove { id: NodeId },
    /// Move a node to a new top-left position
    Position { id: NodeId, position: Pos2 },
    /// Set the selection flag of a node
    Select { id: NodeId, selected: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Add(Edge),
    Remove { id: EdgeId },
    Select { id: EdgeId, selected: bool },
}

/// Apply `changes` in order and return the resulting node list.
///
/// Unaffected nodes keep their relative order; additions go to the end.
/// Changes naming an id that is not present are skipped.
pub fn apply_node_changes(
    changes: &[NodeChange],
    nodes: &[Node],
) -> Vec<Node> {
    let mut out = nodes.to_vec();
    for change in changes {
        match change {
            NodeChange::Add(node) => out.push(node.clone()),
            NodeChange::Remove { id } => out.retain(|n| n.id != *id),
            NodeChange::Position { id, position } => {
                if let Some(node) = out.iter_mut().find(|n| n.id == *id) {
                    node.position = *position;
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = out.iter_mut().find(|n| n.id == *id) {
                    node.selected = *selected;
                }
            }
        }
    }
    out
}

/// Edge counterpart of [`apply_node_changes`].
pub fn apply_edge_changes(
    changes: &[EdgeChange],
    edges: &[Edge],
) -> Vec<Edge> {
    let mut out = edges.to_vec();
    for change in changes {
        match change {
            EdgeChange::Add(edge) => out.push(edge.clone()),
            EdgeChange::Remove { id } => out.retain(|e| e.id != *id),
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = out.iter_mut().find(|e| e.id == *id) {
                    edge.selected = *selected;
                }
            }
        }
    }
    out
}
