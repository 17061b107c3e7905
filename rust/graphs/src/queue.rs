// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indexed binary min-heap.
//!
//! Alongside the heap array the queue keeps a map from item to heap slot, so
//! an item's priority can be read in O(1) and changed in O(log n). Dijkstra
//! uses this for decrease-key during relaxation; the sweep line uses it to
//! reposition an event after its pair was rewritten by a split.

use std::cmp::Ordering;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Min-priority queue of unique items.
#[derive(Debug, Clone)]
pub struct MinPriorityQ<K, V> {
    heap: Vec<(K, V)>,
    index: FxHashMap<K, usize>,
}

impl<K, V> MinPriorityQ<K, V>
where
    K: Copy + Eq + Hash,
    V: PartialOrd,
{
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: &K) -> bool {
        self.index.contains_key(item)
    }

    /// Inserts `item`. An item already queued has its priority replaced.
    pub fn add(&mut self, item: K, priority: V) {
        if let Some(&i) = self.index.get(&item) {
            self.update_at_index(i, priority);
            return;
        }
        let i = self.heap.len();
        self.heap.push((item, priority));
        self.index.insert(item, i);
        self.sift_up(i);
    }

    /// Removes and returns the item with the lowest priority.
    pub fn take(&mut self) -> Option<K> {
        self.take_with_value().map(|(item, _)| item)
    }

    /// Removes and returns the item with the lowest priority along with it.
    pub fn take_with_value(&mut self) -> Option<(K, V)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (item, priority) = self.heap.pop()?;
        self.index.remove(&item);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((item, priority))
    }

    /// The item with the lowest priority, without removing it.
    pub fn peek(&self) -> Option<&K> {
        self.heap.first().map(|(item, _)| item)
    }

    /// The lowest priority currently queued.
    pub fn peek_value(&self) -> Option<&V> {
        self.heap.first().map(|(_, priority)| priority)
    }

    /// Current priority of `item`.
    pub fn get_value(&self, item: &K) -> Option<&V> {
        self.index.get(item).map(|&i| &self.heap[i].1)
    }

    /// Heap slot currently holding `item`.
    pub fn index_of(&self, item: &K) -> Option<usize> {
        self.index.get(item).copied()
    }

    /// Changes the priority of `item`. Returns false if it is not queued.
    pub fn update_item(&mut self, item: &K, priority: V) -> bool {
        match self.index_of(item) {
            Some(i) => {
                self.update_at_index(i, priority);
                true
            }
            None => false,
        }
    }

    /// Replaces the priority stored in heap slot `index` and restores the
    /// heap invariant in whichever direction it was broken.
    pub fn update_at_index(&mut self, index: usize, priority: V) {
        if index >= self.heap.len() {
            return;
        }
        self.heap[index].1 = priority;
        let settled = self.sift_up(index);
        self.sift_down(settled);
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.heap[a].1.partial_cmp(&self.heap[b].1) == Some(Ordering::Less)
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].0, a);
        self.index.insert(self.heap[b].0, b);
    }

    /// Moves slot `i` towards the root; returns its final slot.
    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
        i
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < n && self.less(left, smallest) {
                smallest = left;
            }
            if right < n && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}

impl<K, V> Default for MinPriorityQ<K, V>
where
    K: Copy + Eq + Hash,
    V: PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}
