//! The open set of a search: a binary min-heap of cell indices without decrease-key.
//!
//! Improving the cost of a cell that is already queued simply pushes a second entry. The stale
//! entry surfaces later and is discarded by the caller because the cell is closed by then.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontierError {
    #[error("pop from an empty frontier")]
    Empty,
}

/// A queued cell. `estimated_cost` is the priority, `cost` the distance from the start recorded
/// when the entry was pushed.
#[derive(Clone, Copy, Debug)]
pub struct FrontierEntry<K> {
    pub estimated_cost: K,
    pub cost: K,
    pub index: usize,
}

impl<K: PartialEq> Eq for FrontierEntry<K> {}

impl<K: PartialEq> PartialEq for FrontierEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost) && self.cost.eq(&other.cost)
    }
}

impl<K: Ord> PartialOrd for FrontierEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for FrontierEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on the estimate so the max-heap pops the smallest one; equal estimates
        // favour the entry that is furthest from the start
        match other.estimated_cost.cmp(&self.estimated_cost) {
            Ordering::Equal => self.cost.cmp(&other.cost),
            s => s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Frontier<K> {
    heap: BinaryHeap<FrontierEntry<K>>,
}

impl<K: Ord + Copy> Default for Frontier<K> {
    fn default() -> Self {
        Frontier::new()
    }
}

impl<K: Ord + Copy> Frontier<K> {
    pub fn new() -> Frontier<K> {
        Frontier {
            heap: BinaryHeap::new(),
        }
    }

    /// Queues `index`. Pushing an index that is already queued adds a second entry.
    pub fn push(&mut self, index: usize, estimated_cost: K, cost: K) {
        self.heap.push(FrontierEntry {
            estimated_cost,
            cost,
            index,
        });
    }

    /// Removes the entry with the lowest estimated cost.
    pub fn pop_min(&mut self) -> Result<FrontierEntry<K>, FrontierError> {
        self.heap.pop().ok_or(FrontierError::Empty)
    }

    pub fn peek_min(&self) -> Option<&FrontierEntry<K>> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
