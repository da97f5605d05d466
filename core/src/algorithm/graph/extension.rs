//! Per-element extension tables
//!
//! Algorithms frequently need auxiliary state for every vertex or edge
//! (labels, excess, residual flow) that the graph itself was never designed
//! to hold. An `ExtensionManager` keeps that state beside the graph: an arena
//! of extension records plus an index keyed by the identity of the original
//! element. The graph is never touched, and every extension can be addressed
//! by a stable arena index, which lets records reference each other without
//! ownership cycles.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::{Index, IndexMut};

/// Side table mapping original graph elements of type `T` to extensions `B`
///
/// Extensions are created lazily on first access through the factory
/// supplied at construction, and live as long as the manager. The manager
/// exclusively owns every extension; each arena slot remembers its original
/// element (the prototype) by value.
pub struct ExtensionManager<T, B> {
    factory: Box<dyn Fn() -> B>,
    arena: Vec<(T, B)>,
    index: HashMap<T, usize>,
}

impl<T, B> ExtensionManager<T, B>
where
    T: Copy + Eq + Hash,
{
    /// Creates an empty manager producing blank extensions with `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> B + 'static,
    {
        Self {
            factory: Box::new(factory),
            arena: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a manager with room for `capacity` extensions
    pub fn with_capacity<F>(capacity: usize, factory: F) -> Self
    where
        F: Fn() -> B + 'static,
    {
        Self {
            factory: Box::new(factory),
            arena: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Produces a new blank extension without registering it
    pub fn create_extension(&self) -> B {
        (self.factory)()
    }

    /// Arena index of the extension for `original`, creating it if absent
    pub fn extension_index(&mut self, original: T) -> usize {
        if let Some(&slot) = self.index.get(&original) {
            return slot;
        }
        let slot = self.arena.len();
        let extension = self.create_extension();
        self.arena.push((original, extension));
        self.index.insert(original, slot);
        slot
    }

    /// Extension for `original`, creating it if absent
    pub fn get_extension(&mut self, original: T) -> &mut B {
        let slot = self.extension_index(original);
        &mut self.arena[slot].1
    }

    /// Arena index of an existing extension, without creating one
    pub fn lookup(&self, original: T) -> Option<usize> {
        self.index.get(&original).copied()
    }

    pub fn get(&self, slot: usize) -> Option<&B> {
        self.arena.get(slot).map(|(_, extension)| extension)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut B> {
        self.arena.get_mut(slot).map(|(_, extension)| extension)
    }

    /// Original element the extension at `slot` was created for
    pub fn prototype(&self, slot: usize) -> Option<T> {
        self.arena.get(slot).map(|(original, _)| *original)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Iterates `(prototype, extension)` pairs in creation order
    pub fn iter(&self) -> impl Iterator<Item = (T, &B)> {
        self.arena.iter().map(|(original, extension)| (*original, extension))
    }

    /// Consumes the manager, yielding its arena in creation order
    pub fn into_arena(self) -> Vec<(T, B)> {
        self.arena
    }
}

impl<T, B> Index<usize> for ExtensionManager<T, B> {
    type Output = B;

    fn index(&self, slot: usize) -> &B {
        &self.arena[slot].1
    }
}

impl<T, B> IndexMut<usize> for ExtensionManager<T, B> {
    fn index_mut(&mut self, slot: usize) -> &mut B {
        &mut self.arena[slot].1
    }
}

impl<T, B> fmt::Debug for ExtensionManager<T, B>
where
    T: fmt::Debug,
    B: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("arena", &self.arena)
            .finish_non_exhaustive()
    }
}
