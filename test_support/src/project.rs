//! Throwaway C/C++ project trees with timestamp control.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Directories holding build inputs.
const INPUT_DIRS: [&str; 3] = ["src", "include", "resources"];
/// Directories holding build outputs.
const OUTPUT_DIRS: [&str; 2] = ["obj", "bin"];

/// A project rooted in a temporary directory.
#[derive(Debug)]
pub struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    /// An empty project.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        Self { _dir: dir, root }
    }

    /// A project containing `files`, each with placeholder contents.
    pub fn with_files(files: &[&str]) -> Self {
        let project = Self::new();
        for file in files {
            project.write(file, "/* fixture */\n");
        }
        project
    }

    /// Project root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative`.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    /// Push every input two minutes and every output one minute into the
    /// past, so a later [`touch`](Self::touch) is unambiguously newer than
    /// all outputs regardless of filesystem timestamp resolution.
    pub fn settle(&self) {
        let now = SystemTime::now();
        self.set_tree_mtime(&INPUT_DIRS, now - Duration::from_secs(120));
        self.set_tree_mtime(&OUTPUT_DIRS, now - Duration::from_secs(60));
    }

    /// Mark `relative` as modified now.
    pub fn touch(&self, relative: &str) {
        set_mtime(&self.path(relative), SystemTime::now());
    }

    /// Whether `relative` exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    fn set_tree_mtime(&self, dirs: &[&str], time: SystemTime) {
        for dir in dirs {
            let root = self.path(dir);
            if !root.exists() {
                continue;
            }
            for entry in WalkDir::new(&root) {
                let entry = entry.expect("walk project");
                if entry.file_type().is_file() {
                    let path = Utf8Path::from_path(entry.path()).expect("utf8 path");
                    set_mtime(path, time);
                }
            }
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

fn set_mtime(path: &Utf8Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .expect("open file")
        .set_modified(time)
        .expect("set mtime");
}
