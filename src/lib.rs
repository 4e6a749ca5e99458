//! **rpgarch** - Manage RPG Maker MV save slots across save directories and single-file archives
//!
//! Slots are addressed as `PATH#ids`; copy, move, and remove reconcile whole
//! collections in memory and write each touched one back once.

/// Command-line interface with clap integration
pub mod cli;

/// Command handlers (listing tables, transfer reports, lz-string helpers)
pub mod commands;

/// Save model, storage formats, and the reconciliation engine
pub mod core {
    /// `path#1,3,5-8,10-` parsing and the resumable id generator
    pub mod selector;
    pub use selector::{IdFilter, IdGenerator, Selector, Verdict};

    /// Native directory vs archive file resolution
    pub mod detect;
    pub use detect::{Location, SaveFormat, detect};

    pub mod record;
    pub use record::{IndexSummary, SaveRecord};

    /// Archive entry mapping (compressed or raw JSON payloads)
    pub mod codec;

    /// `global.rpgsave` + `file<ID>.rpgsave` directories
    pub mod native;

    /// Single-file JSON archives
    pub mod archive;

    /// A selector bound to its resolved store
    pub mod collection;
    pub use collection::{Collection, Payload, Scope};

    /// ls / rm / cp / mv over collections
    pub mod reconcile;
    pub use reconcile::{Action, Listing, Report};

    pub mod prompt;
    pub use prompt::{OverwritePrompt, TerminalPrompt};

    pub mod error;
    pub use error::{BodyWrite, SaveError};
}

/// Infrastructure - Configuration, file writes, and lz-string
pub mod infra {
    /// Layered settings (config file, RPGARCH_ env, flags)
    pub mod config;
    pub use config::{Settings, init as config_init, load_config};

    /// Atomic and change-detecting writes
    pub mod io;
    pub use io::{write_atomic, write_if_changed};

    pub mod lzstring;
}

pub use crate::core::{Collection, SaveRecord, Selector};
pub use infra::config::Settings;
