use crate::changes::{EdgeChange, NodeChange};
use crate::context_menu::MenuCommand;
use crate::effects::Effect;
use crate::model::NodeId;
use crate::palette::DataTransfer;
use crate::projection::Viewport;
use crate::settings::EditorSettings;
use crate::store::Store;
use eframe::egui::Pos2;
use log::debug;
use std::path::PathBuf;

/// Actions that can be dispatched to modify the editor state
#[derive(Debug, Clone)]
pub enum Action {
    /// Reset per-frame canvas state
    BeginFrame,

    // Diagram
    /// Node changes reported by the render layer
    ApplyNodeChanges { changes: Vec<NodeChange> },
    /// Edge changes reported by the render layer
    ApplyEdgeChanges { changes: Vec<EdgeChange> },
    /// A completed connect gesture
    Connect { source: NodeId, target: NodeId },
    /// Remove every selected block and edge
    DeleteSelected,

    // Palette drag and drop
    /// A palette payload hovers the canvas
    DragOver { transfer: DataTransfer },
    /// A palette payload was released over the canvas
    DropBlock {
        transfer: DataTransfer,
        pointer: Pos2,
        canvas_min: Pos2,
        viewport: Viewport,
    },

    // Context menu
    /// Secondary click on a block
    OpenContextMenu { node: NodeId, pointer: Pos2 },
    /// Click on empty canvas
    PaneClick,
    /// Pointer pressed anywhere in the window
    PointerDown { pos: Pos2 },
    /// An entry of the context menu was picked
    MenuCommand { command: MenuCommand },
    /// Close the context menu if it is open
    CloseContextMenu,

    // Settings and view
    UpdateSettings { settings: EditorSettings },
    SaveSettings { path: PathBuf },
    SetShowSettings { show: bool },
    RequestFitView,
    ClearFitRequest,
    DismissNotice,
}

/// Apply a single action to modify the store state
pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        Action::BeginFrame => {
            store.canvas.begin_frame();
            vec![]
        }

        // Diagram
        Action::ApplyNodeChanges { changes } => {
            store.diagram.apply_node_changes(&changes);
            vec![]
        }
        Action::ApplyEdgeChanges { changes } => {
            store.diagram.apply_edge_changes(&changes);
            vec![]
        }
        Action::Connect { source, target } => {
            match store.canvas.connect(&mut store.diagram, &source, &target)
            {
                Ok(_) => vec![],
                Err(e) => vec![Effect::Notify {
                    message: e.to_string(),
                }],
            }
        }
        Action::DeleteSelected => {
            let (nodes, edges) = store.diagram.selection_removals();
            debug!(
                "deleting {} selected blocks and {} edges",
                nodes.len(),
                edges.len()
            );
            store.diagram.apply_edge_changes(&edges);
            store.diagram.apply_node_changes(&nodes);
            vec![]
        }

        // Palette drag and drop
        Action::DragOver { transfer } => {
            store.canvas.drag_over(&transfer);
            vec![]
        }
        Action::DropBlock {
            transfer,
            pointer,
            canvas_min,
            viewport,
        } => match store.canvas.drop(
            &mut store.diagram,
            &transfer,
            pointer,
            canvas_min,
            &viewport,
        ) {
            Ok(_) => vec![],
            Err(e) => vec![Effect::Notify {
                message: e.to_string(),
            }],
        },

        // Context menu
        Action::OpenContextMenu { node, pointer } => {
            store.canvas.open_menu(node, pointer);
            vec![]
        }
        Action::PaneClick => {
            store.canvas.pane_click();
            vec![]
        }
        Action::PointerDown { pos } => {
            store.canvas.pointer_down(pos);
            vec![]
        }
        Action::MenuCommand { command } => {
            match store.canvas.menu_command(command) {
                Some(message) => vec![Effect::Notify { message }],
                None => vec![],
            }
        }
        Action::CloseContextMenu => {
            store.canvas.close_menu();
            vec![]
        }

        // Settings and view
        Action::UpdateSettings { settings } => {
            store.apply_settings(settings);
            vec![]
        }
        Action::SaveSettings { path } => {
            vec![Effect::SaveSettings { path }]
        }
        Action::SetShowSettings { show } => {
            store.show_settings = show;
            vec![]
        }
        Action::RequestFitView => {
            store.fit_requested = true;
            vec![]
        }
        Action::ClearFitRequest => {
            store.fit_requested = false;
            vec![]
        }
        Action::DismissNotice => {
            store.notice = None;
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::LabelPolicy;
    use crate::palette::on_block_drag_start;
    use eframe::egui::pos2;

    fn transfer(label: &str) -> DataTransfer {
        let mut t = DataTransfer::default();
        on_block_drag_start(&mut t, label);
        t
    }

    fn drop_actions(label: &str, pointer: Pos2) -> Vec<Action> {
        vec![
            Action::BeginFrame,
            Action::DragOver {
                transfer: transfer(label),
            },
            Action::DropBlock {
                transfer: transfer(label),
                pointer,
                canvas_min: pos2(20.0, 10.0),
                viewport: Viewport::IDENTITY,
            },
        ]
    }

    fn run(store: &mut Store, actions: Vec<Action>) -> Vec<Effect> {
        actions
            .into_iter()
            .flat_map(|a| update(store, a))
            .collect()
    }

    #[test]
    fn drop_sequence_creates_block() {
        let mut store = Store::default();
        let effects = run(&mut store, drop_actions("New Block", pos2(120.0, 80.0)));
        assert!(effects.is_empty());
        let added = store.diagram.nodes().last().unwrap();
        assert_eq!(added.id, NodeId::from("3"));
        assert_eq!(added.position, pos2(100.0, 70.0));
    }

    #[test]
    fn connect_to_unknown_block_is_reported() {
        let mut store = Store::default();
        let effects = update(
            &mut store,
            Action::Connect {
                source: "1".into(),
                target: "42".into(),
            },
        );
        assert!(matches!(&effects[..], [Effect::Notify { .. }]));
        assert_eq!(store.diagram.edges().len(), 1);
    }

    #[test]
    fn hello_world_notifies_and_closes() {
        let mut store = Store::default();
        update(
            &mut store,
            Action::OpenContextMenu {
                node: "1".into(),
                pointer: pos2(200.0, 150.0),
            },
        );
        let effects = update(
            &mut store,
            Action::MenuCommand {
                command: MenuCommand::HelloWorld,
            },
        );
        assert!(matches!(
            &effects[..],
            [Effect::Notify { message }] if message == "Hello World"
        ));
        assert!(!store.canvas.menu().is_open());
        assert_eq!(store.canvas.listeners().active(), 0);
    }

    #[test]
    fn delete_selected_removes_block_and_its_edges() {
        let mut store = Store::default();
        update(
            &mut store,
            Action::ApplyNodeChanges {
                changes: vec![NodeChange::Select {
                    id: "2".into(),
                    selected: true,
                }],
            },
        );
        update(&mut store, Action::DeleteSelected);
        assert_eq!(store.diagram.nodes().len(), 1);
        assert!(store.diagram.edges().is_empty());
    }

    #[test]
    fn settings_update_reaches_controller() {
        let mut store = Store::default();
        let mut settings = store.settings.clone();
        settings.label_policy = LabelPolicy::Synthetic;
        update(&mut store, Action::UpdateSettings { settings });
        run(&mut store, drop_actions("New Block", pos2(50.0, 50.0)));
        assert_eq!(store.diagram.nodes().last().unwrap().label, "Block 3");
    }

    #[test]
    fn escape_style_close_is_idempotent() {
        let mut store = Store::default();
        update(&mut store, Action::CloseContextMenu);
        update(
            &mut store,
            Action::OpenContextMenu {
                node: "1".into(),
                pointer: pos2(1.0, 1.0),
            },
        );
        update(&mut store, Action::CloseContextMenu);
        assert!(!store.canvas.menu().is_open());
        assert_eq!(store.canvas.listeners().active(), 0);
    }
}
