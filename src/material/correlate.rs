//! Texture folder scanning and texture-to-material correlation.

use std::path::{Path, PathBuf};

use crate::util::{Error, Result};

use super::MaterialRecords;

/// Flat listing of the regular files in a texture folder.
#[derive(Clone, Debug)]
pub struct TextureFolder {
    root: PathBuf,
    /// File names, sorted.
    files: Vec<String>,
}

impl TextureFolder {
    /// List the regular files directly inside `dir`.
    ///
    /// Names are sorted so repeated runs see the same scan order.
    /// Entries whose name is not valid UTF-8 are skipped.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::TextureFolder(root));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => files.push(name),
                Err(name) => tracing::warn!(?name, "skipping texture with non UTF-8 name"),
            }
        }
        files.sort();

        tracing::info!(folder = %root.display(), files = files.len(), "scanned texture folder");
        Ok(Self { root, files })
    }

    /// Build a listing from known names without touching the filesystem.
    pub fn from_files(root: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Absolute OS-native path of a file in this folder.
    ///
    /// None if the file no longer exists or the path cannot be made absolute.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let path = self.root.join(name);
        if !path.is_file() {
            return None;
        }
        std::path::absolute(&path)
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    }
}

/// Filenames whose lowercase form contains the lowercase identifier, in input order.
pub fn correlate(identifier: &str, files: &[String]) -> Vec<String> {
    let needle = identifier.to_lowercase();
    files
        .iter()
        .filter(|f| f.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Populate every record with its correlated filenames.
///
/// A file may land in several records; files matching none are dropped.
#[tracing::instrument(skip_all, fields(materials = records.len(), files = files.len()))]
pub fn correlate_records(records: &mut MaterialRecords, files: &[String]) {
    for record in records.iter_mut() {
        record.textures = correlate(&record.identifier, files);
        tracing::debug!(
            material = %record.identifier,
            textures = record.textures.len(),
            "correlated textures"
        );
    }
}
