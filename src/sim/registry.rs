//! Object registries kept alongside the grid
//!
//! Every rock, diamond and enemy tile has exactly one registry entry at the
//! same position. Order is irrelevant, removal is swap-with-last.

use serde::{Deserialize, Serialize};

use super::grid::{Dir, Pos};

/// Anything registered at a grid position
pub trait Located {
    fn pos(&self) -> Pos;
}

/// A rock or diamond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boulder {
    pub pos: Pos,
    /// Dropped on its last physics pass
    pub falling: bool,
}

impl Boulder {
    pub fn at(pos: Pos) -> Self {
        Self { pos, falling: false }
    }
}

impl Located for Boulder {
    fn pos(&self) -> Pos {
        self.pos
    }
}

/// A firefly or butterfly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Pos,
    pub dir: Dir,
}

impl Located for Enemy {
    fn pos(&self) -> Pos {
        self.pos
    }
}

/// Dense unordered set with O(1) swap-remove
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Located> Registry<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Index of the entry at `pos`
    pub fn find(&self, pos: Pos) -> Option<usize> {
        self.items.iter().position(|item| item.pos() == pos)
    }

    /// Remove by index; the last entry takes its slot
    pub fn swap_remove(&mut self, index: usize) -> T {
        self.items.swap_remove(index)
    }

    /// Remove the first entry at `pos`
    pub fn remove_at(&mut self, pos: Pos) -> Option<T> {
        self.find(pos).map(|i| self.items.swap_remove(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Positions in registry order, for passes that mutate while walking
    pub fn positions(&self) -> Vec<Pos> {
        self.items.iter().map(Located::pos).collect()
    }
}
