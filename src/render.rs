use crate::block_shape::BlockShape;
use crate::changes::{EdgeChange, NodeChange};
use crate::diagram::Diagram;
use crate::layout_pinned::{LayoutPinned, LayoutStatePinned};
use crate::model::{Edge, EdgeId, Node, NodeId};
use crate::projection::Viewport;
use eframe::egui::{self, Pos2, Vec2, pos2};
use egui_graphs::events::Event;
use egui_graphs::{DefaultEdgeShape, Graph, GraphView, MetadataFrame};
use log::trace;
use petgraph::Directed;
use petgraph::graph::DefaultIx;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use std::collections::{HashMap, HashSet};

// ------------------------------------------------------------------
// Type aliases for the display graph
// ------------------------------------------------------------------

pub type DiagramGraph =
    Graph<Node, Edge, Directed, DefaultIx, BlockShape, DefaultEdgeShape>;

pub type DiagramView<'a> = GraphView<
    'a,
    Node,
    Edge,
    Directed,
    DefaultIx,
    BlockShape,
    DefaultEdgeShape,
    LayoutStatePinned,
    LayoutPinned,
>;

/// Display graph kept in step with a [`Diagram`].
///
/// The diagram is authoritative. Whenever its versions move, the display
/// graph is reconciled by id: stale elements are removed, new ones added
/// and existing ones refreshed in place so egui_graphs keeps its
/// interaction state.
pub struct DisplaySync {
    graph: DiagramGraph,
    nodes: HashMap<NodeId, NodeIndex>,
    edges: HashMap<EdgeId, EdgeIndex>,
    synced: Option<(u64, u64)>,
    block_size: Vec2,
}

impl DisplaySync {
    pub fn new(block_size: Vec2) -> Self {
        Self {
            graph: DiagramGraph::from(&StableGraph::<Node, Edge>::default()),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            synced: None,
            block_size,
        }
    }

    pub fn graph(&self) -> &DiagramGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DiagramGraph {
        &mut self.graph
    }

    pub fn set_block_size(&mut self, size: Vec2) {
        if size != self.block_size {
            self.block_size = size;
            self.synced = None;
        }
    }

    /// Centre of a block whose top-left corner is `top_left`.
    pub fn display_location(&self, top_left: Pos2) -> Pos2 {
        top_left + self.block_size / 2.0
    }

    /// Inverse of [`DisplaySync::display_location`].
    pub fn model_position(&self, location: Pos2) -> Pos2 {
        location - self.block_size / 2.0
    }

    /// Reconcile with `diagram`. Returns whether anything was done.
    pub fn sync(&mut self, diagram: &Diagram) -> bool {
        let versions = diagram.versions();
        if self.synced == Some(versions) {
            return false;
        }
        trace!("syncing display graph to versions {versions:?}");

        let live_nodes: HashSet<&NodeId> =
            diagram.nodes().iter().map(|n| &n.id).collect();
        let live_edges: HashMap<&EdgeId, &Edge> =
            diagram.edges().iter().map(|e| (&e.id, e)).collect();

        // Edges first so node removal never sees a mapped edge it owns.
        let stale_edges: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(id, idx)| {
                match (live_edges.get(id), self.graph.edge(**idx)) {
                    (Some(live), Some(shown)) => {
                        let shown = shown.payload();
                        shown.source != live.source
                            || shown.target != live.target
                    }
                    _ => true,
                }
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale_edges {
            if let Some(idx) = self.edges.remove(&id) {
                self.graph.remove_edge(idx);
            }
        }

        let stale_nodes: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|id| !live_nodes.contains(id))
            .cloned()
            .collect();
        for id in stale_nodes {
            if let Some(idx) = self.nodes.remove(&id) {
                self.graph.remove_node(idx);
            }
        }
        // Node removal takes incident edges with it.
        self.edges.retain(|_, idx| self.graph.edge(*idx).is_some());

        for node in diagram.nodes() {
            let location = self.display_location(node.position);
            let idx = match self.nodes.get(&node.id) {
                Some(idx) => *idx,
                None => {
                    let idx = self.graph.add_node(node.clone());
                    self.nodes.insert(node.id.clone(), idx);
                    idx
                }
            };
            if let Some(shown) = self.graph.node_mut(idx) {
                *shown.payload_mut() = node.clone();
                shown.set_location(location);
                shown.set_label(node.label.clone());
            }
        }

        for edge in diagram.edges() {
            if let Some(idx) = self.edges.get(&edge.id) {
                if let Some(shown) = self.graph.edge_mut(*idx) {
                    *shown.payload_mut() = edge.clone();
                }
                continue;
            }
            let (Some(source), Some(target)) =
                (self.nodes.get(&edge.source), self.nodes.get(&edge.target))
            else {
                continue;
            };
            let idx = self.graph.add_edge_with_label(
                *source,
                *target,
                edge.clone(),
                String::new(),
            );
            self.edges.insert(edge.id.clone(), idx);
        }

        self.synced = Some(versions);
        true
    }

    pub fn node_id(&self, idx: NodeIndex) -> Option<NodeId> {
        self.graph.node(idx).map(|n| n.payload().id.clone())
    }

    pub fn edge_id(&self, idx: EdgeIndex) -> Option<EdgeId> {
        self.graph.edge(idx).map(|e| e.payload().id.clone())
    }

    pub fn hovered_node(&self) -> Option<NodeId> {
        self.graph.hovered_node().and_then(|idx| self.node_id(idx))
    }

    /// Turn interaction events reported by the view into change
    /// descriptors for the store.
    pub fn changes_from_events(
        &self,
        events: impl IntoIterator<Item = Event>,
    ) -> (Vec<NodeChange>, Vec<EdgeChange>) {
        let mut node_changes = Vec::new();
        let mut edge_changes = Vec::new();
        for event in events {
            match event {
                Event::NodeMove(p) => {
                    if let Some(id) = self.node_id(NodeIndex::new(p.id)) {
                        let location = pos2(p.new_pos[0], p.new_pos[1]);
                        node_changes.push(NodeChange::Position {
                            id,
                            position: self.model_position(location),
                        });
                    }
                }
                Event::NodeSelect(p) => {
                    if let Some(id) = self.node_id(NodeIndex::new(p.id)) {
                        node_changes
                            .push(NodeChange::Select { id, selected: true });
                    }
                }
                Event::NodeDeselect(p) => {
                    if let Some(id) = self.node_id(NodeIndex::new(p.id)) {
                        node_changes
                            .push(NodeChange::Select { id, selected: false });
                    }
                }
                Event::EdgeSelect(p) => {
                    if let Some(id) = self.edge_id(EdgeIndex::new(p.id)) {
                        edge_changes
                            .push(EdgeChange::Select { id, selected: true });
                    }
                }
                Event::EdgeDeselect(p) => {
                    if let Some(id) = self.edge_id(EdgeIndex::new(p.id)) {
                        edge_changes
                            .push(EdgeChange::Select { id, selected: false });
                    }
                }
                _ => {}
            }
        }
        (node_changes, edge_changes)
    }
}

// ------------------------------------------------------------------
// Per-frame metadata
// ------------------------------------------------------------------

/// Current pan/zoom of the graph view. egui_graphs keeps `pan`
/// widget-local and adds the widget's top-left only when drawing.
pub fn viewport_from_metadata(ui: &egui::Ui) -> Viewport {
    let meta = MetadataFrame::new(None).load(ui);
    Viewport::new(meta.pan, meta.zoom)
}

/// Write a new pan/zoom for the graph view. Takes effect the next time
/// the view is drawn.
pub fn apply_viewport(ui: &mut egui::Ui, viewport: Viewport) {
    let mut meta = MetadataFrame::new(None).load(ui);
    meta.pan = viewport.pan;
    meta.zoom = viewport.zoom;
    meta.save(ui);
}
