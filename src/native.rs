#![cfg(not(target_arch = "wasm32"))]

use crate::create_app_with;
use crate::settings::{DEFAULT_SETTINGS_FILE, EditorSettings};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Block diagram editor", long_about = None)]
pub struct Args {
    /// Settings file (default: ./block-flow.json when present)
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .filter_module("egui", log::LevelFilter::Info)
    .filter_module("eframe", log::LevelFilter::Info)
    .format_timestamp_millis()
    .init();
}

/// Entry point used by the native executable.
pub fn run() -> eframe::Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity);
    debug!("command-line args: {args:?}");

    let settings = EditorSettings::load_or_default(args.settings.as_deref());
    let settings_path = args
        .settings
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    info!("block-flow starting");

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Block Flow",
        native_options,
        Box::new(move |cc| Ok(Box::new(create_app_with(cc, settings, settings_path)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings_and_verbosity() {
        let args =
            Args::try_parse_from(["block-flow", "-vv", "--settings", "x.json"])
                .unwrap();
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.settings, Some(PathBuf::from("x.json")));
    }

    #[test]
    fn defaults_without_flags() {
        let args = Args::try_parse_from(["block-flow"]).unwrap();
        assert_eq!(args.verbosity, 0);
        assert!(args.settings.is_none());
    }
}
