//! Lookup structures over the archive's images.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use regex::Regex;

use crate::archive::{MediaEntry, MediaLibrary};

/// Export tools sometimes prepend `<counter>-<TYPE>-<date>-<time>-` to the
/// real file name, e.g. `00000012-PHOTO-2023-05-12-14-03-21-IMG_1234.jpg`.
static EXPORT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+-[A-Z]+-\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2}-")
        .expect("export prefix pattern must compile")
});

/// Returns the file name without its export prefix, if it has one.
pub fn strip_export_prefix(filename: &str) -> Option<&str> {
    EXPORT_PREFIX
        .find(filename)
        .map(|m| &filename[m.end()..])
        .filter(|rest| !rest.is_empty())
}

/// How an image was found for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Case-insensitive equality with a lookup key
    Exact,
    /// One of the name and a lookup key contains the other
    Substring,
    /// Next unused image from the fallback pool
    Fallback,
}

#[derive(Debug, Clone, Copy)]
struct Slot<'a> {
    entry: &'a MediaEntry,
    alias: bool,
}

/// Case-insensitive lookup from image file names to archive entries.
///
/// Every image is reachable by its own name and, when it carries an export
/// prefix, by the stripped name as well. A real file name always wins over
/// another file's stripped alias.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex<'a> {
    slots: HashMap<String, Slot<'a>>,
    /// Keys in insertion order, for the substring scan.
    keys: Vec<String>,
}

impl<'a> ImageIndex<'a> {
    /// Indexes every image of the library.
    pub fn build(library: &'a MediaLibrary) -> Self {
        let mut index = Self::default();
        for entry in library.images() {
            index.insert(entry.filename.to_lowercase(), entry, false);
            if let Some(stripped) = strip_export_prefix(&entry.filename) {
                index.insert(stripped.to_lowercase(), entry, true);
            }
        }
        index
    }

    fn insert(&mut self, key: String, entry: &'a MediaEntry, alias: bool) {
        match self.slots.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().alias && !alias {
                    occupied.insert(Slot { entry, alias });
                }
            }
            Entry::Vacant(vacant) => {
                self.keys.push(vacant.key().clone());
                vacant.insert(Slot { entry, alias });
            }
        }
    }

    /// Number of lookup keys (names plus aliases).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the archive had no images.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Case-insensitive exact lookup.
    pub fn exact(&self, filename: &str) -> Option<&'a MediaEntry> {
        self.slots
            .get(&filename.to_lowercase())
            .map(|slot| slot.entry)
    }

    /// First key (in insertion order) that contains the name or is
    /// contained in it.
    pub fn substring(&self, filename: &str) -> Option<&'a MediaEntry> {
        let wanted = filename.to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.keys
            .iter()
            .find(|key| key.contains(&wanted) || wanted.contains(key.as_str()))
            .and_then(|key| self.slots.get(key))
            .map(|slot| slot.entry)
    }

    /// Exact lookup, then substring scan.
    pub fn find(&self, filename: &str) -> Option<(&'a MediaEntry, MatchKind)> {
        self.exact(filename)
            .map(|entry| (entry, MatchKind::Exact))
            .or_else(|| {
                self.substring(filename)
                    .map(|entry| (entry, MatchKind::Substring))
            })
    }
}

/// Images handed out, in archive order, to image messages that matched
/// nothing.
///
/// Each image is handed out at most once. The pool is an explicit value owned
/// by a single resolution pass, so pops happen strictly in message order.
#[derive(Debug, Clone, Default)]
pub struct FallbackPool<'a> {
    queue: VecDeque<&'a MediaEntry>,
}

impl<'a> FallbackPool<'a> {
    /// Fills the pool with every image of the library, in archive order.
    pub fn from_library(library: &'a MediaLibrary) -> Self {
        Self {
            queue: library.images().collect(),
        }
    }

    /// Removes and returns the next unused image.
    pub fn take_next(&mut self) -> Option<&'a MediaEntry> {
        self.queue.pop_front()
    }

    /// Images still available.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl<'a> FromIterator<&'a MediaEntry> for FallbackPool<'a> {
    fn from_iter<I: IntoIterator<Item = &'a MediaEntry>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}
