use crate::model::NodeId;
use eframe::egui::{self, Pos2, Rect, pos2};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Screen position of the menu's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPosition {
    pub top: f32,
    pub left: f32,
}

impl MenuPosition {
    pub fn at(pointer: Pos2) -> Self {
        Self {
            top: pointer.y,
            left: pointer.x,
        }
    }

    pub fn to_pos2(self) -> Pos2 {
        pos2(self.left, self.top)
    }
}

/// What the user picked in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    HelloWorld,
    Close,
}

pub enum MenuState {
    Closed,
    Open(OpenMenu),
}

/// An open menu owns its outside-click registration; dropping it
/// deregisters the listener.
pub struct OpenMenu {
    pub position: MenuPosition,
    pub node: NodeId,
    pub listener: ListenerGuard,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        matches!(self, MenuState::Open(_))
    }

    pub fn position(&self) -> Option<MenuPosition> {
        match self {
            MenuState::Closed => None,
            MenuState::Open(menu) => Some(menu.position),
        }
    }
}

impl fmt::Debug for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuState::Closed => f.write_str("Closed"),
            MenuState::Open(menu) => f
                .debug_struct("Open")
                .field("position", &menu.position)
                .field("node", &menu.node)
                .finish(),
        }
    }
}

// ------------------------------------------------------------------
// Pointer-down listeners
// ------------------------------------------------------------------

#[derive(Default)]
struct Registry {
    next_id: u64,
    slots: Vec<Slot>,
}

struct Slot {
    id: u64,
    bounds: Option<Rect>,
}

/// Process-wide pointer-down registrations used to detect clicks outside
/// a transient widget. Registrations are only handed out as
/// [`ListenerGuard`]s.
#[derive(Clone, Default)]
pub struct PointerDownListeners {
    inner: Rc<RefCell<Registry>>,
}

impl PointerDownListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ListenerGuard {
        let mut reg = self.inner.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.slots.push(Slot { id, bounds: None });
        ListenerGuard {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Number of live registrations.
    pub fn active(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Ids of the listeners whose widget bounds do not contain `pos`.
    /// Listeners whose widget has not been laid out yet are not notified.
    pub fn outside(&self, pos: Pos2) -> Vec<u64> {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|s| s.bounds.is_some_and(|b| !b.contains(pos)))
            .map(|s| s.id)
            .collect()
    }
}

impl fmt::Debug for PointerDownListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerDownListeners")
            .field("active", &self.active())
            .finish()
    }
}

/// A live pointer-down registration. Deregisters itself on drop.
pub struct ListenerGuard {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl ListenerGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Record the on-screen bounds of the widget this listener guards.
    pub fn set_bounds(&self, bounds: Rect) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut reg = registry.borrow_mut();
        if let Some(slot) = reg.slots.iter_mut().find(|s| s.id == self.id) {
            slot.bounds = Some(bounds);
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(reg) = self.registry.upgrade() {
            reg.borrow_mut().slots.retain(|s| s.id != self.id);
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

// ------------------------------------------------------------------
// Presentation
// ------------------------------------------------------------------

/// Draw the menu for an open state and report the picked command.
pub fn show_context_menu(
    ctx: &egui::Context,
    menu: &OpenMenu,
) -> Option<MenuCommand> {
    let mut command = None;
    let area = egui::Area::new(egui::Id::new("block_context_menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(menu.position.to_pos2())
        .show(ctx, |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_min_width(120.0);
                if ui.button("Hello World").clicked() {
                    command = Some(MenuCommand::HelloWorld);
                }
                if ui.button("Close").clicked() {
                    command = Some(MenuCommand::Close);
                }
            });
        });
    menu.listener.set_bounds(area.response.rect);
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn guard_registers_and_releases() {
        let listeners = PointerDownListeners::new();
        let guard = listeners.acquire();
        assert_eq!(listeners.active(), 1);
        drop(guard);
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn outside_respects_bounds() {
        let listeners = PointerDownListeners::new();
        let guard = listeners.acquire();
        assert!(listeners.outside(pos2(0.0, 0.0)).is_empty());

        guard.set_bounds(Rect::from_min_size(
            pos2(200.0, 150.0),
            vec2(120.0, 60.0),
        ));
        assert!(listeners.outside(pos2(210.0, 160.0)).is_empty());
        assert_eq!(listeners.outside(pos2(10.0, 10.0)), vec![guard.id()]);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let listeners = PointerDownListeners::new();
        let guard = listeners.acquire();
        drop(listeners);
        guard.set_bounds(Rect::NOTHING);
        drop(guard);
    }

    #[test]
    fn menu_position_maps_pointer() {
        let p = MenuPosition::at(pos2(200.0, 150.0));
        assert_eq!(p.left, 200.0);
        assert_eq!(p.top, 150.0);
        assert_eq!(p.to_pos2(), pos2(200.0, 150.0));
    }
}
