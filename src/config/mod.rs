//! Tiered configuration.
//!
//! Configuration is merged field-by-field from, lowest priority first:
//! 1. **Defaults** - `Config::default()`
//! 2. **Project** - `$CWD/hits/config.yaml`
//! 3. **User** - `~/.hits/config.yaml`
//! 4. **Environment** - variable overrides
//!
//! ## Environment Variables
//! - `HITS_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `HITS_DB_PATH` - Database path
//! - `HITS_PROJECT_DIR` - Project config dir (default: `./hits`)
//! - `HITS_USER_DIR` - User config dir (default: `~/.hits`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
