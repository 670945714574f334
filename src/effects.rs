use crate::store::Store;
use log::{info, warn};
use std::path::PathBuf;

/// Deferred effects that run after the reducer (notices, file IO)
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show a message to the user
    Notify { message: String },
    /// Write the current settings to disk
    SaveSettings { path: PathBuf },
}

/// Execute a single effect against the store
pub fn run(store: &mut Store, effect: Effect) {
    match effect {
        Effect::Notify { message } => {
            info!("{message}");
            store.notice = Some(message);
        }
        Effect::SaveSettings { path } => match store.save_settings(&path) {
            Ok(()) => {
                info!("saved settings to {}", path.display());
                store.settings_path = path;
            }
            Err(e) => {
                warn!("{e}");
                store.notice = Some(e.to_string());
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_sets_notice() {
        let mut store = Store::default();
        run(
            &mut store,
            Effect::Notify {
                message: "Hello World".to_owned(),
            },
        );
        assert_eq!(store.notice.as_deref(), Some("Hello World"));
    }

    #[test]
    fn failed_save_is_surfaced() {
        let mut store = Store::default();
        run(
            &mut store,
            Effect::SaveSettings {
                path: PathBuf::from("/nonexistent/dir/block-flow.json"),
            },
        );
        assert!(store.notice.is_some());
    }
}
