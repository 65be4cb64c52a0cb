//! Owning storage for registered windows

use super::{Window, WindowId};
use std::collections::HashMap;

/// Sole owner of every registered window
///
/// Everything else in the crate refers to windows by [`WindowId`]; a window
/// is destroyed only when it is removed from (or dropped with) the arena.
#[derive(Default)]
pub struct WindowArena {
    windows: HashMap<WindowId, Box<dyn Window>>,
    next_id: u64,
}

impl WindowArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a window and hand out its handle
    pub fn insert(&mut self, window: Box<dyn Window>) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.windows.insert(id, window);
        id
    }

    /// Give a window back to the caller
    pub fn remove(&mut self, id: WindowId) -> Option<Box<dyn Window>> {
        self.windows.remove(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&dyn Window> {
        self.windows.get(&id).map(|window| window.as_ref())
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut (dyn Window + 'static)> {
        self.windows.get_mut(&id).map(|window| window.as_mut())
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Handles of all stored windows in ascending order
    pub fn ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<_> = self.windows.keys().copied().collect();
        ids.sort();
        ids
    }
}
