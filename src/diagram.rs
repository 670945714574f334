use crate::changes::{
    EdgeChange, NodeChange, apply_edge_changes, apply_node_changes,
};
use crate::model::{Edge, EdgeId, Node, NodeId};
use crate::versioned::Versioned;
use eframe::egui::pos2;
use log::{debug, warn};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    #[error("a node with id {0} already exists")]
    DuplicateNodeId(NodeId),
    #[error("no node with id {0}")]
    UnknownNode(NodeId),
}

/// Ordered node and edge collections. Every mutation of either list goes
/// through this type.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    nodes: Versioned<Vec<Node>>,
    edges: Versioned<Vec<Edge>>,
}

impl Diagram {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: Versioned::new(nodes),
            edges: Versioned::new(edges),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        self.nodes.get()
    }

    pub fn edges(&self) -> &[Edge] {
        self.edges.get()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// (node version, edge version)
    pub fn versions(&self) -> (u64, u64) {
        (self.nodes.version(), self.edges.version())
    }

    /// Append `node` at the end of the collection.
    pub fn add_node(&mut self, node: Node) -> Result<(), DiagramError> {
        if self.contains_node(&node.id) {
            warn!("rejecting node with duplicate id {}", node.id);
            return Err(DiagramError::DuplicateNodeId(node.id));
        }
        debug!("adding node {} at {:?}", node.id, node.position);
        self.nodes.modify(|nodes| nodes.push(node));
        Ok(())
    }

    /// Append an edge from `source` to `target` with a fresh id.
    ///
    /// Parallel edges and self-loops are accepted.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeId, DiagramError> {
        for endpoint in [source, target] {
            if !self.contains_node(endpoint) {
                warn!("rejecting edge to unknown node {endpoint}");
                return Err(DiagramError::UnknownNode(endpoint.clone()));
            }
        }
        let id = self.fresh_edge_id(source, target);
        debug!("connecting {source} -> {target} as {id}");
        let edge = Edge::new(id.clone(), source.clone(), target.clone());
        self.edges.modify(|edges| edges.push(edge));
        Ok(id)
    }

    /// Fold render-layer node changes into the collection.
    ///
    /// Additions with an id already present are dropped. Edges touching a
    /// removed node go with it, even when the id is re-added later in the
    /// same batch.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        if changes.is_empty() {
            return;
        }
        let mut seen: HashSet<NodeId> =
            self.nodes.iter().map(|n| n.id.clone()).collect();
        let mut removed: HashSet<NodeId> = HashSet::new();
        let mut accepted = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                NodeChange::Add(node) => {
                    if seen.insert(node.id.clone()) {
                        accepted.push(change.clone());
                    } else {
                        warn!(
                            "dropping add of duplicate node id {}",
                            node.id
                        );
                    }
                }
                NodeChange::Remove { id } => {
                    if seen.remove(id) {
                        removed.insert(id.clone());
                    }
                    accepted.push(change.clone());
                }
                _ => accepted.push(change.clone()),
            }
        }

        let next = apply_node_changes(&accepted, self.nodes.get());
        self.nodes.set(next);

        let dangling: Vec<EdgeChange> = self
            .edges
            .iter()
            .filter(|e| {
                removed.contains(&e.source)
                    || removed.contains(&e.target)
                    || !self.contains_node(&e.source)
                    || !self.contains_node(&e.target)
            })
            .map(|e| EdgeChange::Remove { id: e.id.clone() })
            .collect();
        if !dangling.is_empty() {
            debug!("removing {} edges of removed nodes", dangling.len());
            self.apply_edge_changes(&dangling);
        }
    }

    /// Fold render-layer edge changes into the collection. Additions that
    /// would reference a missing node or reuse a present id are dropped.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        if changes.is_empty() {
            return;
        }
        let mut seen: HashSet<EdgeId> =
            self.edges.iter().map(|e| e.id.clone()).collect();
        let mut accepted = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                EdgeChange::Add(edge) => {
                    if !self.contains_node(&edge.source)
                        || !self.contains_node(&edge.target)
                    {
                        warn!("dropping edge {} with missing endpoint", edge.id);
                    } else if !seen.insert(edge.id.clone()) {
                        warn!("dropping add of duplicate edge id {}", edge.id);
                    } else {
                        accepted.push(change.clone());
                    }
                }
                EdgeChange::Remove { id } => {
                    seen.remove(id);
                    accepted.push(change.clone());
                }
                EdgeChange::Select { .. } => accepted.push(change.clone()),
            }
        }
        let next = apply_edge_changes(&accepted, self.edges.get());
        self.edges.set(next);
    }

    /// Remove changes for every selected node and edge.
    pub fn selection_removals(&self) -> (Vec<NodeChange>, Vec<EdgeChange>) {
        let nodes = self
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| NodeChange::Remove { id: n.id.clone() })
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| e.selected)
            .map(|e| EdgeChange::Remove { id: e.id.clone() })
            .collect();
        (nodes, edges)
    }

    fn fresh_edge_id(&self, source: &NodeId, target: &NodeId) -> EdgeId {
        let base = format!("edge-{source}-{target}");
        let taken = |candidate: &str| {
            self.edges.iter().any(|e| e.id.as_str() == candidate)
        };
        if !taken(&base) {
            return EdgeId::new(base);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return EdgeId::new(candidate);
            }
            n += 1;
        }
    }
}

/// The two-block diagram the editor opens with.
pub fn initial_diagram() -> Diagram {
    Diagram::new(
        vec![
            Node::block("1", pos2(250.0, 50.0), "Block 1"),
            Node::block("2", pos2(250.0, 200.0), "Block 2"),
        ],
        vec![Edge::new("edge-1-2", "1", "2")],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_appends_one_fresh_edge() {
        let mut d = initial_diagram();
        let before: Vec<EdgeId> =
            d.edges().iter().map(|e| e.id.clone()).collect();

        let id = d.connect(&"1".into(), &"2".into()).unwrap();

        assert_eq!(d.edges().len(), before.len() + 1);
        assert!(!before.contains(&id));
        let added = d.edges().last().unwrap();
        assert_eq!(added.id, id);
        assert_eq!(added.source, NodeId::from("1"));
        assert_eq!(added.target, NodeId::from("2"));
    }

    #[test]
    fn parallel_edges_and_self_loops_are_allowed() {
        let mut d = initial_diagram();
        let a = d.connect(&"1".into(), &"2".into()).unwrap();
        let b = d.connect(&"1".into(), &"2".into()).unwrap();
        let c = d.connect(&"2".into(), &"2".into()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "edge-1-2-2");
        assert_eq!(b.as_str(), "edge-1-2-3");
        assert_eq!(c.as_str(), "edge-2-2");
        assert_eq!(d.edges().len(), 4);
    }

    #[test]
    fn connect_rejects_unknown_endpoint() {
        let mut d = initial_diagram();
        let version = d.versions();
        let err = d.connect(&"1".into(), &"9".into()).unwrap_err();
        assert_eq!(err, DiagramError::UnknownNode("9".into()));
        assert_eq!(d.edges().len(), 1);
        assert_eq!(d.versions(), version);
    }

    #[test]
    fn add_node_rejects_duplicate_id() {
        let mut d = initial_diagram();
        let err = d
            .add_node(Node::block("2", pos2(0.0, 0.0), "again"))
            .unwrap_err();
        assert_eq!(err, DiagramError::DuplicateNodeId("2".into()));
        assert_eq!(d.nodes().len(), 2);
        assert_eq!(d.nodes()[1].label, "Block 2");
    }

    #[test]
    fn add_node_appends_and_bumps_version() {
        let mut d = initial_diagram();
        let (nodes_v, edges_v) = d.versions();
        d.add_node(Node::block("3", pos2(1.0, 2.0), "Block 3"))
            .unwrap();
        assert_eq!(d.nodes().last().unwrap().id, NodeId::from("3"));
        assert_eq!(d.versions(), (nodes_v + 1, edges_v));
    }

    #[test]
    fn removing_a_node_drops_its_edges() {
        let mut d = initial_diagram();
        d.connect(&"2".into(), &"2".into()).unwrap();
        d.add_node(Node::block("3", pos2(0.0, 0.0), "Block 3"))
            .unwrap();
        d.connect(&"1".into(), &"3".into()).unwrap();

        d.apply_node_changes(&[NodeChange::Remove { id: "2".into() }]);

        assert_eq!(d.nodes().len(), 2);
        let remaining: Vec<&str> =
            d.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["edge-1-3"]);
    }

    #[test]
    fn duplicate_add_change_is_dropped() {
        let mut d = initial_diagram();
        d.apply_node_changes(&[
            NodeChange::Add(Node::block("1", pos2(0.0, 0.0), "dup")),
            NodeChange::Add(Node::block("5", pos2(0.0, 0.0), "ok")),
        ]);
        let ids: Vec<&str> =
            d.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "5"]);
    }

    #[test]
    fn remove_then_re_add_in_one_batch_is_accepted() {
        let mut d = initial_diagram();
        d.apply_node_changes(&[
            NodeChange::Remove { id: "2".into() },
            NodeChange::Add(Node::block("2", pos2(9.0, 9.0), "back")),
        ]);
        assert_eq!(d.nodes().len(), 2);
        assert_eq!(d.nodes()[1].label, "back");
        // the old block's edge does not carry over to the new one
        assert!(d.edges().is_empty());
    }

    #[test]
    fn duplicate_edge_id_add_is_dropped() {
        let mut d = initial_diagram();
        d.apply_edge_changes(&[
            EdgeChange::Add(Edge::new("edge-1-2", "2", "1")),
            EdgeChange::Add(Edge::new("edge-2-1", "2", "1")),
            EdgeChange::Add(Edge::new("edge-2-1", "1", "1")),
        ]);
        let ids: Vec<&str> =
            d.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge-1-2", "edge-2-1"]);
        assert_eq!(d.edges()[0].source, NodeId::from("1"));
    }

    #[test]
    fn edge_id_can_be_reused_after_removal_in_one_batch() {
        let mut d = initial_diagram();
        d.apply_edge_changes(&[
            EdgeChange::Remove {
                id: "edge-1-2".into(),
            },
            EdgeChange::Add(Edge::new("edge-1-2", "2", "1")),
        ]);
        assert_eq!(d.edges().len(), 1);
        assert_eq!(d.edges()[0].source, NodeId::from("2"));
    }

    #[test]
    fn edge_add_with_missing_endpoint_is_dropped() {
        let mut d = initial_diagram();
        d.apply_edge_changes(&[EdgeChange::Add(Edge::new("x", "1", "7"))]);
        assert_eq!(d.edges().len(), 1);
    }

    #[test]
    fn selection_removals_cover_nodes_and_edges() {
        let mut d = initial_diagram();
        d.apply_node_changes(&[NodeChange::Select {
            id: "1".into(),
            selected: true,
        }]);
        d.apply_edge_changes(&[EdgeChange::Select {
            id: "edge-1-2".into(),
            selected: true,
        }]);
        let (nodes, edges) = d.selection_removals();
        assert_eq!(nodes, vec![NodeChange::Remove { id: "1".into() }]);
        assert_eq!(
            edges,
            vec![EdgeChange::Remove {
                id: "edge-1-2".into()
            }]
        );
    }
}
