//! Undo/redo history with coalescing.
//!
//! Entries are stored newest first. The cursor counts how many entries have
//! been undone: entries `0..cursor` form the redo branch and `cursor..` are
//! still applied. Every entry carries full before/after snapshots of the
//! elements it touches, so applying it never depends on other entries.

use crate::elements::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept; the oldest are dropped beyond this.
pub const MAX_HISTORY: usize = 200;

/// What an entry did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Create,
    Update,
    Remove,
}

/// Before/after state of one element in an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryElement {
    pub id: ElementId,
    /// State before the change; `None` for creations.
    pub prev: Option<Element>,
    /// State after the change; `None` for removals.
    pub new: Option<Element>,
}

/// One undoable change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: EntryKind,
    pub elements: Vec<EntryElement>,
    /// Sorted, comma-joined ids of the affected elements, when coalescable.
    pub ids: Option<String>,
    /// Operation key, when coalescable.
    pub keys: Option<String>,
}

/// Canonical key for a set of element ids.
pub fn ids_key(ids: impl IntoIterator<Item = ElementId>) -> String {
    let mut ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    ids.sort();
    ids.join(",")
}

impl HistoryEntry {
    pub fn create(elements: &[Element]) -> Self {
        Self {
            kind: EntryKind::Create,
            elements: elements
                .iter()
                .map(|e| EntryElement {
                    id: e.id(),
                    prev: None,
                    new: Some(e.snapshot()),
                })
                .collect(),
            ids: None,
            keys: None,
        }
    }

    pub fn remove(elements: &[Element]) -> Self {
        Self {
            kind: EntryKind::Remove,
            elements: elements
                .iter()
                .map(|e| EntryElement {
                    id: e.id(),
                    prev: Some(e.snapshot()),
                    new: None,
                })
                .collect(),
            ids: None,
            keys: None,
        }
    }

    /// An update from `(before, after)` pairs.
    pub fn update(pairs: impl IntoIterator<Item = (Element, Element)>) -> Self {
        Self {
            kind: EntryKind::Update,
            elements: pairs
                .into_iter()
                .map(|(prev, new)| EntryElement {
                    id: new.id(),
                    prev: Some(prev.snapshot()),
                    new: Some(new.snapshot()),
                })
                .collect(),
            ids: None,
            keys: None,
        }
    }

    /// Mark the entry as coalescable under `keys`, keyed by its element ids.
    pub fn coalescing(mut self, keys: impl Into<String>) -> Self {
        self.ids = Some(ids_key(self.elements.iter().map(|e| e.id)));
        self.keys = Some(keys.into());
        self
    }

    /// Fold knock-on `(before, after)` changes into an update. An element
    /// already in the entry keeps its before-state. The coalescing key is
    /// left alone.
    pub fn with_knock_on(mut self, pairs: Vec<(Element, Element)>) -> Self {
        for (prev, new) in pairs {
            match self.elements.iter_mut().find(|e| e.id == new.id()) {
                Some(existing) => existing.new = Some(new.snapshot()),
                None => self.elements.push(EntryElement {
                    id: new.id(),
                    prev: Some(prev.snapshot()),
                    new: Some(new.snapshot()),
                }),
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn coalesces_with(&self, other: &HistoryEntry) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        self.kind == EntryKind::Update
            && other.kind == EntryKind::Update
            && non_empty(&self.ids)
            && non_empty(&self.keys)
            && self.ids == other.ids
            && self.keys == other.keys
    }
}

/// The element container history entries are applied to.
pub trait ElementStore {
    /// Insert an element at the stacking position given by its `order`.
    fn insert_element(&mut self, element: Element);
    fn remove_element(&mut self, id: ElementId) -> Option<Element>;
    /// Replace the element with the same id. Returns false if it is missing.
    fn replace_element(&mut self, element: Element) -> bool;
}

/// Which side of an entry to apply.
#[derive(Clone, Copy)]
enum Side {
    Prev,
    New,
}

fn apply(entry: &HistoryEntry, side: Side, store: &mut dyn ElementStore) {
    for item in &entry.elements {
        let target = match side {
            Side::Prev => &item.prev,
            Side::New => &item.new,
        };
        match target {
            // an update never resurrects an element that has since gone away
            Some(element) if entry.kind == EntryKind::Update => {
                store.replace_element(element.clone());
            }
            Some(element) => {
                if !store.replace_element(element.clone()) {
                    store.insert_element(element.clone());
                }
            }
            None => {
                store.remove_element(item.id);
            }
        }
    }
}

/// Linear undo/redo stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently undone.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn is_undo_disabled(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    pub fn is_redo_disabled(&self) -> bool {
        self.cursor == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Record a change that has already been applied.
    ///
    /// Discards the redo branch. If the entry coalesces with the newest one,
    /// the newest entry's after-states are replaced instead of pushing.
    /// Returns true when the entry was coalesced.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if entry.is_empty() {
            return false;
        }
        if self.cursor > 0 {
            log::debug!("Discarding {} redo entries", self.cursor);
            self.entries.drain(..self.cursor);
            self.cursor = 0;
        }

        if let Some(tip) = self.entries.front_mut() {
            if tip.coalesces_with(&entry) {
                for incoming in entry.elements {
                    match tip.elements.iter_mut().find(|e| e.id == incoming.id) {
                        Some(existing) => existing.new = incoming.new,
                        None => tip.elements.push(incoming),
                    }
                }
                return true;
            }
        }

        self.entries.push_front(entry);
        if self.entries.len() > MAX_HISTORY {
            self.entries.pop_back();
        }
        false
    }

    /// The newest applied entry.
    pub fn tip(&self) -> Option<&HistoryEntry> {
        if self.cursor > 0 {
            return None;
        }
        self.entries.front()
    }

    /// Revert the newest applied entry. Returns false when there is nothing to undo.
    pub fn undo(&mut self, store: &mut dyn ElementStore) -> bool {
        let Some(entry) = self.entries.get(self.cursor) else {
            return false;
        };
        apply(entry, Side::Prev, store);
        self.cursor += 1;
        true
    }

    /// Re-apply the most recently undone entry. Returns false when there is nothing to redo.
    pub fn redo(&mut self, store: &mut dyn ElementStore) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        if let Some(entry) = self.entries.get(self.cursor) {
            apply(entry, Side::New, store);
        }
        true
    }
}
