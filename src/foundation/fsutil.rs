use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{MintError, MintResult};

/// Create `dir` and any missing parents. Succeeds if it already exists.
pub(crate) fn ensure_dir(dir: &Path) -> MintResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create directory '{}'", dir.display()))?;
    Ok(())
}

/// Create the parent directory of `path`, if it has one.
pub(crate) fn ensure_parent(path: &Path) -> MintResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Read a whole file as UTF-8, mapping a missing file to [`MintError::NotFound`].
pub(crate) fn read_to_string(path: &Path, what: &str) -> MintResult<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MintError::not_found(format!(
            "{what} '{}' does not exist",
            path.display()
        ))),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("read {what} '{}'", path.display()))
            .into()),
    }
}
