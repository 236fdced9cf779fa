//! Working directory listing shown before the scripts run.

use crate::error::{Result, RunError};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntryInfo {
    /// Name with a trailing `/` for directories and `@` for symlinks, like `ls -F`.
    pub fn display_name(&self) -> String {
        match self.kind {
            EntryKind::Directory => format!("{}/", self.name),
            EntryKind::Symlink => format!("{}@", self.name),
            EntryKind::File | EntryKind::Other => self.name.clone(),
        }
    }
}

/// Lists `dir`, sorted by name. Hidden entries are included.
pub fn list_directory(dir: &Path) -> Result<Vec<DirEntryInfo>> {
    let entries = fs::read_dir(dir).map_err(|e| RunError::directory(dir, e.to_string()))?;

    let mut listing = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RunError::directory(dir, e.to_string()))?;
        let kind = match entry.file_type() {
            Ok(ft) if ft.is_symlink() => EntryKind::Symlink,
            Ok(ft) if ft.is_dir() => EntryKind::Directory,
            Ok(ft) if ft.is_file() => EntryKind::File,
            _ => EntryKind::Other,
        };
        listing.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
        });
    }

    listing.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}
