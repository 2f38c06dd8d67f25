//! Resource copying.

use super::BuildError;
use crate::config::ProjectLayout;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Mirror `resources/` into `bin/resources/`.
///
/// Returns `false` without touching `bin/` when the source tree is absent or
/// empty. Existing files in the target are overwritten; nothing is deleted.
pub(super) fn copy_resources(layout: &ProjectLayout) -> Result<bool, BuildError> {
    let source_root = layout.resources_dir.as_std_path();
    if !has_entries(source_root)? {
        debug!(dir = %layout.resources_dir, "no resources to copy");
        return Ok(false);
    }
    let target_root = layout.resources_target();
    for walked in WalkDir::new(source_root).sort_by_file_name() {
        let entry = walked.map_err(|err| BuildError::CopyResources {
            path: err
                .path()
                .map_or_else(|| source_root.to_path_buf(), Path::to_path_buf),
            source: err.into(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        let target = target_root.as_std_path().join(relative);
        let copy_error = |source| BuildError::CopyResources {
            path: entry.path().to_path_buf(),
            source,
        };
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(copy_error)?;
        } else {
            fs::copy(entry.path(), &target).map_err(copy_error)?;
        }
    }
    debug!(from = %layout.resources_dir, to = %target_root, "copied resources");
    Ok(true)
}

fn has_entries(dir: &Path) -> Result<bool, BuildError> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir).map_err(|source| BuildError::CopyResources {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::{TempDir, tempdir};

    fn layout() -> (TempDir, ProjectLayout) {
        let dir = tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        (dir, ProjectLayout::new(root))
    }

    #[test]
    fn absent_resources_are_skipped() {
        let (_dir, layout) = layout();
        assert!(!copy_resources(&layout).expect("copy"));
        assert!(!layout.resources_target().exists());
    }

    #[test]
    fn empty_resources_are_skipped() {
        let (_dir, layout) = layout();
        fs::create_dir_all(&layout.resources_dir).expect("create resources");
        assert!(!copy_resources(&layout).expect("copy"));
        assert!(!layout.bin_dir.exists());
    }

    #[test]
    fn nested_resources_are_mirrored() {
        let (_dir, layout) = layout();
        fs::create_dir_all(layout.resources_dir.join("fonts")).expect("create fonts");
        fs::write(layout.resources_dir.join("level.txt"), "1").expect("write level");
        fs::write(layout.resources_dir.join("fonts/mono.ttf"), "ttf").expect("write font");
        assert!(copy_resources(&layout).expect("copy"));
        let target = layout.resources_target();
        assert_eq!(
            fs::read_to_string(target.join("fonts/mono.ttf")).expect("read font"),
            "ttf"
        );
        assert!(target.join("level.txt").is_file());
    }
}
