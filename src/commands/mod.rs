//! The publish and dump operations behind the CLI subcommands.
//!
//! Both are written against [`HitStore`](crate::store::HitStore) and take
//! their output streams as arguments, so they can run against any store and
//! be captured in tests.

pub mod dump;
pub mod publish;

use anyhow::{Context, Result};
use std::path::Path;

/// Resolve a template path to the absolute name it is stored under.
///
/// Symlinks are not followed and the file need not exist. Paths that are not
/// valid UTF-8 are rejected, since a lossy name could collide with another.
pub fn template_name(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("failed to resolve template path {}", path.display()))?;
    absolute
        .to_str()
        .map(str::to_owned)
        .with_context(|| format!("template path is not valid UTF-8: {}", absolute.display()))
}
