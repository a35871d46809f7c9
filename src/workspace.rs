//! Disposable scene workspaces
//!
//! Injection mutates script files in place, so every render pass gets a
//! private recursive copy of the scene assets. The copy lives in a temp
//! directory that is deleted when the workspace is dropped, which covers
//! every exit path of a render call, including errors raised mid-capture.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::TempDir;

use crate::{Error, Result};

/// An exclusively-owned copy of the scene asset tree for one render pass
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    /// Copy the scene assets at `scene_dir` into a fresh temp directory.
    ///
    /// No workspace is ever reused or shared: each call produces a new,
    /// observably distinct directory.
    pub fn acquire(scene_dir: &Path) -> Result<Self> {
        if !scene_dir.is_dir() {
            return Err(Error::Config(format!(
                "scene directory {} does not exist",
                scene_dir.display()
            )));
        }

        let dir = TempDir::new()?;
        let name = scene_dir
            .file_name()
            .ok_or_else(|| Error::Config(format!("invalid scene path {}", scene_dir.display())))?;
        let root = dir.path().join(name);
        copy_tree(scene_dir, &root)?;

        Ok(Self { dir, root })
    }

    /// Root of the private asset copy
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a file inside the workspace
    pub fn file(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Delete the workspace eagerly.
    ///
    /// Dropping has the same effect; this exists so callers can surface the
    /// cleanup outcome without letting it mask an earlier error.
    pub fn release(self) {
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove workspace: {}", e);
        }
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
