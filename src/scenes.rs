//! Scene file discovery and substitution wiring.
//!
//! Scenes are plain `.hlsl` files in a scene folder beneath the shader
//! folder. Every scene is mounted under the same logical include name
//! ([`SCENE_HEADER_NAME`]); switching scenes means handing the includer a
//! fresh substitution that redirects that name to the chosen file. The
//! last-write time is exposed so a caller can poll for reload-on-save.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::Result;
use crate::includer::Substitution;

/// Logical include name the active scene is mounted under.
pub const SCENE_HEADER_NAME: &str = "scene.hlsl";

/// Enumerates scene files and builds their includer substitutions.
#[derive(Debug)]
pub struct SceneLibrary {
    shader_folder: PathBuf,
    /// Scene folder relative to the shader folder.
    scene_folder: PathBuf,
}

impl SceneLibrary {
    #[must_use]
    pub fn new(shader_folder: impl Into<PathBuf>, scene_folder: impl Into<PathBuf>) -> Self {
        Self {
            shader_folder: shader_folder.into(),
            scene_folder: scene_folder.into(),
        }
    }

    /// Stem names of all `.hlsl` files in the scene folder, sorted.
    pub fn list_scenes(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.shader_folder.join(&self.scene_folder))? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == "hlsl")
                && let Some(stem) = path.file_stem()
            {
                names.push(stem.to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Path of a scene file relative to the shader folder.
    #[must_use]
    pub fn scene_file(&self, name: &str) -> PathBuf {
        self.scene_folder.join(format!("{name}.hlsl"))
    }

    /// Substitution redirecting the scene include to a concrete scene.
    #[must_use]
    pub fn substitution_for(&self, name: &str) -> Substitution {
        (
            SCENE_HEADER_NAME.to_owned(),
            self.scene_file(name).to_string_lossy().into_owned(),
        )
    }

    /// Last write time of a scene file, for reload-on-save polling.
    pub fn last_modified(&self, name: &str) -> Result<SystemTime> {
        let path: &Path = &self.shader_folder.join(self.scene_file(name));
        Ok(std::fs::metadata(path)?.modified()?)
    }
}
