use crate::context_menu::{
    MenuCommand, MenuPosition, MenuState, OpenMenu, PointerDownListeners,
};
use crate::diagram::{Diagram, DiagramError};
use crate::model::{EdgeId, Node, NodeId};
use crate::palette::{BLOCK_FORMAT, DataTransfer, DropEffect};
use crate::projection::{Projection, pointer_to_model};
use eframe::egui::Pos2;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONNECT_THRESHOLD: f32 = 2.0;

/// Which label a dropped block receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelPolicy {
    /// The label carried in the drag channel
    #[default]
    Dragged,
    /// `"Block {id}"`, ignoring the dragged label
    Synthetic,
}

/// Pointer state for one frame, as far as the connect gesture cares.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerSample {
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    pub pos: Option<Pos2>,
}

#[derive(Debug, Clone, PartialEq)]
struct ConnectDrag {
    source: NodeId,
    origin: Pos2,
    started: bool,
}

/// Result of feeding one frame to the connect gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectStep {
    /// Screen-space segment to draw as a preview
    pub preview: Option<(Pos2, Pos2)>,
    /// `(source, target)` once the gesture completes over a block
    pub completed: Option<(NodeId, NodeId)>,
}

/// Translates pointer and drag input into diagram mutations and menu
/// transitions.
#[derive(Debug)]
pub struct CanvasController {
    next_id: u64,
    menu: MenuState,
    listeners: PointerDownListeners,
    drop_effect: DropEffect,
    connecting: Option<ConnectDrag>,
    label_policy: LabelPolicy,
    connect_threshold: f32,
}

impl CanvasController {
    pub fn new(initial_node_count: usize) -> Self {
        Self {
            next_id: initial_node_count as u64 + 1,
            menu: MenuState::Closed,
            listeners: PointerDownListeners::new(),
            drop_effect: DropEffect::None,
            connecting: None,
            label_policy: LabelPolicy::default(),
            connect_threshold: DEFAULT_CONNECT_THRESHOLD,
        }
    }

    pub fn with_label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }

    pub fn set_label_policy(&mut self, policy: LabelPolicy) {
        self.label_policy = policy;
    }

    pub fn set_connect_threshold(&mut self, threshold: f32) {
        self.connect_threshold = threshold.max(0.0);
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn listeners(&self) -> &PointerDownListeners {
        &self.listeners
    }

    /// Id the next dropped block would receive, ignoring collisions.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.as_ref().is_some_and(|c| c.started)
    }

    /// Reset per-frame state. Call once at the start of every frame.
    pub fn begin_frame(&mut self) {
        self.drop_effect = DropEffect::None;
    }

    // --------------------------------------------------------------
    // Drag and drop
    // --------------------------------------------------------------

    /// A palette payload hovers the canvas this frame. Returns whether a
    /// drop would be accepted.
    pub fn drag_over(&mut self, transfer: &DataTransfer) -> bool {
        if transfer.allows(DropEffect::Move) {
            self.drop_effect = DropEffect::Move;
            true
        } else {
            false
        }
    }

    /// Handle a drop at `pointer` (window pixels). `canvas_min` is the
    /// top-left of the canvas widget.
    ///
    /// Returns the id of the created block, or `None` when the drop was
    /// not armed by [`CanvasController::drag_over`] this frame or the
    /// payload carries no label.
    pub fn drop(
        &mut self,
        diagram: &mut Diagram,
        transfer: &DataTransfer,
        pointer: Pos2,
        canvas_min: Pos2,
        projection: &impl Projection,
    ) -> Result<Option<NodeId>, DiagramError> {
        let armed = self.drop_effect == DropEffect::Move;
        self.drop_effect = DropEffect::None;
        if !armed {
            debug!("drop ignored: no drag-over this frame");
            return Ok(None);
        }
        let Some(dragged) =
            transfer.get_data(BLOCK_FORMAT).filter(|l| !l.is_empty())
        else {
            debug!("drop ignored: empty payload");
            return Ok(None);
        };

        let position = pointer_to_model(pointer, canvas_min, projection);
        let id = self.allocate_id(diagram);
        let label = match self.label_policy {
            LabelPolicy::Dragged => dragged.to_owned(),
            LabelPolicy::Synthetic => format!("Block {id}"),
        };
        diagram.add_node(Node::block(id.clone(), position, label))?;
        info!("dropped block {id} at ({}, {})", position.x, position.y);
        Ok(Some(id))
    }

    fn allocate_id(&mut self, diagram: &Diagram) -> NodeId {
        loop {
            let id = NodeId::new(self.next_id.to_string());
            self.next_id += 1;
            if !diagram.contains_node(&id) {
                return id;
            }
        }
    }

    // --------------------------------------------------------------
    // Context menu
    // --------------------------------------------------------------

    /// Secondary click on `node` at screen position `pointer`.
    pub fn open_menu(&mut self, node: NodeId, pointer: Pos2) {
        // The previous registration must be gone before a new one exists.
        self.close_menu();
        let listener = self.listeners.acquire();
        debug!("context menu for {node} at {pointer:?}");
        self.menu = MenuState::Open(OpenMenu {
            position: MenuPosition::at(pointer),
            node,
            listener,
        });
    }

    /// Returns whether a menu was open.
    pub fn close_menu(&mut self) -> bool {
        let was_open = self.menu.is_open();
        self.menu = MenuState::Closed;
        was_open
    }

    /// Click on empty canvas.
    pub fn pane_click(&mut self) {
        self.close_menu();
    }

    /// Pointer pressed anywhere in the window.
    pub fn pointer_down(&mut self, pos: Pos2) {
        let MenuState::Open(menu) = &self.menu else {
            return;
        };
        let id = menu.listener.id();
        if self.listeners.outside(pos).contains(&id) {
            self.close_menu();
        }
    }

    /// Apply a menu selection. Returns the acknowledgment to surface, if
    /// any.
    pub fn menu_command(&mut self, command: MenuCommand) -> Option<String> {
        self.close_menu();
        match command {
            MenuCommand::HelloWorld => Some("Hello World".to_owned()),
            MenuCommand::Close => None,
        }
    }

    // --------------------------------------------------------------
    // Connect gesture
    // --------------------------------------------------------------

    /// Press on a block, drag, release over a block.
    pub fn track_connect(
        &mut self,
        pointer: &PointerSample,
        hovered: Option<&NodeId>,
    ) -> ConnectStep {
        let mut step = ConnectStep::default();

        if pointer.pressed
            && let Some(source) = hovered
            && let Some(origin) = pointer.pos
        {
            self.connecting = Some(ConnectDrag {
                source: source.clone(),
                origin,
                started: false,
            });
        }

        // Distance from the press point, so slow drags still start.
        if pointer.down
            && let Some(drag) = self.connecting.as_mut()
            && let Some(pos) = pointer.pos
            && pos.distance(drag.origin) > self.connect_threshold
        {
            drag.started = true;
        }

        if let Some(drag) = &self.connecting
            && drag.started
        {
            step.preview = pointer.pos.map(|to| (drag.origin, to));
        }

        if pointer.released {
            if let Some(drag) = self.connecting.take()
                && drag.started
                && let Some(target) = hovered
            {
                step.completed = Some((drag.source, target.clone()));
            }
            step.preview = None;
        }

        step
    }

    pub fn cancel_connect(&mut self) {
        self.connecting = None;
    }

    /// Forward a completed gesture to the store.
    pub fn connect(
        &self,
        diagram: &mut Diagram,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeId, DiagramError> {
        diagram.connect(source, target)
    }
}
