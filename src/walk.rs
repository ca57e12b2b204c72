use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

pub const IGNORED_ENTRY: &str = ".DS_Store";

/// Calls `visit` for every non-directory entry under `path`, depth first,
/// siblings in name order. A `path` that is not a directory is visited as-is.
pub fn walk<F>(path: &Path, visit: &mut F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let metadata =
        fs::symlink_metadata(path).with_context(|| format!("Failed to find {:?}", path))?;
    if !metadata.is_dir() {
        return visit(path);
    }

    walk_dir(path, visit)
}

fn walk_dir<F>(dir: &Path, visit: &mut F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut entries = fs::read_dir(dir)
        .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
        .with_context(|| format!("Failed to list {:?}", dir))?;
    entries.retain(|entry| entry.file_name().as_os_str() != OsStr::new(IGNORED_ENTRY));
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {:?}", path))?;

        if file_type.is_dir() {
            walk_dir(&path, visit)?;
        } else {
            visit(&path)?;
        }
    }

    Ok(())
}
