//! JSON persistence for resolved works and canon indexes.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::work::ResolvedWork;
use crate::canon::VerseToCanonIndex;
use crate::constants::output::{CANON_INDEX_FILE, COVERAGE_FILE, VERSE_INDEX_FILE};
use crate::error::{Error, Result};

/// Trait for persisting derived data.
///
/// Implementations decide where and in what form the data lands; the
/// library only hands over resolved values.
pub trait Exporter: Send + Sync {
    /// Persist one resolved work.
    ///
    /// # Returns
    /// The paths written, or an error if nothing could be written. A failed
    /// work must not leave partial files behind.
    fn export_work(&self, work: &ResolvedWork) -> Result<Vec<PathBuf>>;

    /// Persist a verse-to-canon index under `name`.
    fn export_canon(&self, name: &str, index: &VerseToCanonIndex) -> Result<PathBuf>;
}

/// Writes pretty-printed JSON into one directory per work.
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    root: PathBuf,
}

impl JsonDirectory {
    /// Export below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Exporter for JsonDirectory {
    fn export_work(&self, work: &ResolvedWork) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(&work.name);
        let coverage_path = dir.join(COVERAGE_FILE);
        let index_path = dir.join(VERSE_INDEX_FILE);

        // Serialize everything before touching the disk
        let coverage = to_json(&work.coverage(), &coverage_path)?;
        let index = to_json(&work.index, &index_path)?;

        write_all_atomic(&[
            (coverage_path.as_path(), coverage.as_str()),
            (index_path.as_path(), index.as_str()),
        ])?;
        Ok(vec![coverage_path, index_path])
    }

    fn export_canon(&self, name: &str, index: &VerseToCanonIndex) -> Result<PathBuf> {
        let path = self.root.join(name).join(CANON_INDEX_FILE);
        let text = to_json(index, &path)?;
        write_all_atomic(&[(path.as_path(), text.as_str())])?;
        Ok(path)
    }
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
    serde_json::from_str(&text).map_err(|e| Error::json(e, path.to_path_buf()))
}

fn to_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<String> {
    let mut text =
        serde_json::to_string_pretty(value).map_err(|e| Error::json(e, path.to_path_buf()))?;
    text.push('\n');
    Ok(text)
}

/// Write a group of files so that either all of them are replaced or none.
///
/// Every file is staged as a sibling `.json.tmp` first. Targets are then
/// swapped in one at a time, keeping the previous contents as `.json.bak`
/// until the whole group is in place. Any failure restores the previous
/// files and removes the staged ones.
fn write_all_atomic(files: &[(&Path, &str)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for &(path, contents) in files {
        match stage(path, contents) {
            Ok(tmp) => staged.push((tmp, path)),
            Err(e) => {
                discard(staged.iter().map(|(tmp, _)| tmp.as_path()));
                return Err(e);
            }
        }
    }

    let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
    for (i, (tmp, path)) in staged.iter().enumerate() {
        match commit(tmp, path) {
            Ok(backup) => committed.push((*path, backup)),
            Err(e) => {
                roll_back(&committed);
                discard(staged[i..].iter().map(|(tmp, _)| tmp.as_path()));
                return Err(e);
            }
        }
    }

    discard(committed.iter().filter_map(|(_, backup)| backup.as_deref()));
    Ok(())
}

fn stage(path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent).map_err(|e| Error::io(e, parent.to_path_buf()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs_err::write(&tmp, contents).map_err(|e| Error::io(e, tmp.clone()))?;
    Ok(tmp)
}

/// Move `tmp` onto `path`, returning where the old file was kept, if any.
fn commit(tmp: &Path, path: &Path) -> Result<Option<PathBuf>> {
    let backup = if path.is_file() {
        let backup = path.with_extension("json.bak");
        fs_err::rename(path, &backup).map_err(|e| Error::io(e, path.to_path_buf()))?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs_err::rename(tmp, path) {
        if let Some(backup) = &backup {
            restore(backup, path);
        }
        return Err(Error::io(e, path.to_path_buf()));
    }
    Ok(backup)
}

fn roll_back(committed: &[(&Path, Option<PathBuf>)]) {
    for (path, backup) in committed.iter().rev() {
        match backup {
            Some(backup) => restore(backup, path),
            None => discard(std::iter::once(*path)),
        }
    }
}

fn restore(backup: &Path, path: &Path) {
    if let Err(e) = fs_err::rename(backup, path) {
        tracing::error!("Could not restore {}: {e}", path.display());
    }
}

fn discard<'p>(paths: impl IntoIterator<Item = &'p Path>) {
    for path in paths {
        if let Err(e) = fs_err::remove_file(path) {
            tracing::warn!("Could not remove {}: {e}", path.display());
        }
    }
}
