//! Archive entry naming.

use std::collections::HashSet;

use keepsake_postgres::model::UNKNOWN_OWNER;

use super::PhotoRecord;

/// Characters that are invalid in a path component on common filesystems.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Derives unique, traversal-free entry paths for one archive.
///
/// Paths have the form `owner/[album/]file`. Uniqueness is checked
/// case-insensitively, so one namer must be used per archive.
#[derive(Debug, Default)]
pub struct EntryNamer {
    issued: HashSet<String>,
}

impl EntryNamer {
    /// Creates a namer with no issued paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of paths issued so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Returns `true` if no path was issued yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Returns the archive path for `record`.
    ///
    /// A path that was already issued gets `_{id}` inserted before the
    /// extension, then `_{id}_{n}` with `n = 2, 3, ...` until it is free.
    pub fn name(&mut self, record: &PhotoRecord) -> String {
        let mut dir = sanitize_component(&record.owner_display_name);
        if dir.is_empty() {
            dir = UNKNOWN_OWNER.to_owned();
        }

        if let Some(album) = record.album_name.as_deref().map(sanitize_component)
            && !album.is_empty()
        {
            dir.push('/');
            dir.push_str(&album);
        }

        let leaf = leaf_name(record);
        let candidate = format!("{dir}/{leaf}");
        if self.claim(&candidate) {
            return candidate;
        }

        let (stem, extension) = split_extension(&leaf);
        let id = record.id;
        let candidate = format!("{dir}/{stem}_{id}{extension}");
        if self.claim(&candidate) {
            return candidate;
        }

        let mut counter = 2_u32;
        loop {
            let candidate = format!("{dir}/{stem}_{id}_{counter}{extension}");
            if self.claim(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn claim(&mut self, path: &str) -> bool {
        self.issued.insert(path.to_lowercase())
    }
}

/// File name of the entry: the recorded name, else the last storage path
/// segment, else `{id}.jpg`.
fn leaf_name(record: &PhotoRecord) -> String {
    let from_file_name = record.file_name.as_deref().map(sanitize_component);
    let from_storage_path = || {
        record
            .storage_path
            .rsplit(['/', '\\'])
            .find(|segment| !segment.trim().is_empty())
            .map(sanitize_component)
    };

    from_file_name
        .filter(|name| !name.is_empty())
        .or_else(|| from_storage_path().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| format!("{}.jpg", record.id))
}

/// Makes one path component safe to extract.
///
/// Reserved and control characters become `_`, surrounding whitespace is
/// trimmed and dot-only names (`.`, `..`) become underscores.
fn sanitize_component(raw: &str) -> String {
    let sanitized: String = raw
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if !sanitized.is_empty() && sanitized.chars().all(|c| c == '.') {
        return "_".repeat(sanitized.len());
    }

    sanitized
}

/// Splits `leaf` into stem and extension (with its dot).
fn split_extension(leaf: &str) -> (&str, &str) {
    match leaf.rfind('.') {
        Some(index) if index > 0 => leaf.split_at(index),
        _ => (leaf, ""),
    }
}
