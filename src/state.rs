use crate::actions::{self, Action};
use crate::effects::{self, Effect};
use crate::store::Store;

/// Store plus the queues that feed it, in delivery order.
pub struct State {
    pub store: Store,
    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
}

impl State {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            action_queue: Vec::new(),
            effect_queue: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    pub fn flush_actions(&mut self) {
        let actions = std::mem::take(&mut self.action_queue);
        for action in actions {
            let mut effects = actions::update(&mut self.store, action);
            self.effect_queue.append(&mut effects);
        }
    }

    pub fn flush_effects(&mut self) {
        let effects = std::mem::take(&mut self.effect_queue);
        for effect in effects {
            effects::run(&mut self.store, effect);
        }
    }

    pub fn flush(&mut self) {
        self.flush_actions();
        self.flush_effects();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_menu::MenuCommand;
    use eframe::egui::pos2;

    #[test]
    fn queued_actions_apply_in_order() {
        let mut state = State::new(Store::default());
        state.dispatch(Action::OpenContextMenu {
            node: "1".into(),
            pointer: pos2(10.0, 10.0),
        });
        state.dispatch(Action::MenuCommand {
            command: MenuCommand::HelloWorld,
        });
        assert!(!state.store.canvas.menu().is_open());

        state.flush_actions();
        assert!(state.store.notice.is_none());
        state.flush_effects();
        assert_eq!(state.store.notice.as_deref(), Some("Hello World"));
        assert!(!state.store.canvas.menu().is_open());
    }
}
