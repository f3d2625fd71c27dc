//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `quicknote_core` linkage and configuration end to end.
//! - Print store statistics for the configured slot.
//!
//! Usage: `quicknote [config.toml]`

use log::error;
use quicknote_core::{
    core_version, init_logging_from_config, open_storage, ping, CoreConfig, NoteStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match CoreConfig::load_from(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("quicknote: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging_from_config(&config.logging) {
        eprintln!("quicknote: logging disabled: {err}");
    }

    println!("quicknote_core ping={}", ping());
    println!("quicknote_core version={}", core_version());
    println!(
        "storage backend={} key={}",
        config.storage.backend, config.storage.key
    );

    let storage = match open_storage(&config.storage) {
        Ok(storage) => storage,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            eprintln!("quicknote: {err}");
            return ExitCode::FAILURE;
        }
    };

    let store = NoteStore::from_config(storage, &config.storage);
    let stats = store.stats();
    println!(
        "notes total={} active={} completed={}",
        stats.total, stats.active, stats.completed
    );
    println!("tags {}", store.all_tags().join(","));
    ExitCode::SUCCESS
}
