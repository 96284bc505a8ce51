//! Arena-backed doubly linked list used for recency ordering.
//!
//! Nodes live in a `Vec` of slots and link to each other by slot index, so
//! the list is plain safe Rust. A [`NodeId`] returned on insertion stays
//! valid until that node is removed, which lets a caller relocate or remove
//! a node in O(1) without walking the list. Freed slots are reused; the
//! generation stored in each slot makes an old id to a reused slot fail with
//! [`ListError::StaleNode`] instead of touching the new occupant.
//!
//! Every method takes the internal lock once. A sequence of calls is not
//! atomic; callers that need that wrap the list in their own lock.

use parking_lot::Mutex;

use super::error::ListError;

/// Stable handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    slot: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

#[derive(Debug)]
struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn node(&self, slot: usize) -> &Node<T> {
        match &self.slots[slot].node {
            Some(node) => node,
            None => unreachable!("linked slot {slot} is free"),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<T> {
        match &mut self.slots[slot].node {
            Some(node) => node,
            None => unreachable!("linked slot {slot} is free"),
        }
    }

    fn resolve(&self, id: NodeId) -> Result<usize, ListError> {
        match self.slots.get(id.slot) {
            Some(slot) if slot.generation == id.generation && slot.node.is_some() => Ok(id.slot),
            _ => Err(ListError::StaleNode(id)),
        }
    }

    /// Stores a detached node and returns its slot.
    fn allocate(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                entry.generation += 1;
                entry.node = Some(node);
                NodeId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    slot: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, slot: usize) -> T {
        let node = self.slots[slot].node.take();
        self.free.push(slot);
        match node {
            Some(node) => node.value,
            None => unreachable!("released slot {slot} twice"),
        }
    }

    /// Slot at ordinal position `index`, walking from the nearer end.
    fn slot_at(&self, index: usize) -> Result<usize, ListError> {
        if index >= self.len {
            return Err(ListError::InvalidIndex {
                index,
                len: self.len,
            });
        }

        let mut current;
        if index <= self.len / 2 {
            current = self.head;
            for _ in 0..index {
                current = current.and_then(|slot| self.node(slot).next);
            }
        } else {
            current = self.tail;
            for _ in 0..(self.len - 1 - index) {
                current = current.and_then(|slot| self.node(slot).prev);
            }
        }

        current.ok_or(ListError::InvalidIndex {
            index,
            len: self.len,
        })
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.node_mut(head).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.len += 1;
    }

    fn link_back(&mut self, slot: usize) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(slot);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
    }

    /// Links `slot` right before `before`, which must not be the head.
    fn link_before(&mut self, slot: usize, before: usize) {
        let prev = self.node(before).prev;
        {
            let node = self.node_mut(slot);
            node.prev = prev;
            node.next = Some(before);
        }
        self.node_mut(before).prev = Some(slot);
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.len += 1;
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    fn move_front(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    fn remove(&mut self, slot: usize) -> T {
        self.unlink(slot);
        self.release(slot)
    }
}

/// Ordered sequence with O(1) front insertion, tail removal and
/// move-to-front by [`NodeId`].
#[derive(Debug)]
pub struct RecencyList<T> {
    inner: Mutex<Arena<T>>,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Arena::new()),
        }
    }

    /// Inserts `value` so that it ends up at position `index`.
    ///
    /// `index == len` appends.
    pub fn insert(&self, value: T, index: usize) -> Result<NodeId, ListError> {
        let mut arena = self.inner.lock();
        if index > arena.len {
            return Err(ListError::InvalidIndex {
                index,
                len: arena.len,
            });
        }

        if index == 0 {
            let id = arena.allocate(value);
            arena.link_front(id.slot);
            return Ok(id);
        }
        if index == arena.len {
            let id = arena.allocate(value);
            arena.link_back(id.slot);
            return Ok(id);
        }

        let before = arena.slot_at(index)?;
        let id = arena.allocate(value);
        arena.link_before(id.slot, before);
        Ok(id)
    }

    pub fn push_front(&self, value: T) -> NodeId {
        let mut arena = self.inner.lock();
        let id = arena.allocate(value);
        arena.link_front(id.slot);
        id
    }

    pub fn push_back(&self, value: T) -> NodeId {
        let mut arena = self.inner.lock();
        let id = arena.allocate(value);
        arena.link_back(id.slot);
        id
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T, ListError> {
        let mut arena = self.inner.lock();
        let slot = arena.slot_at(index)?;
        Ok(arena.remove(slot))
    }

    pub fn remove_first(&self) -> Result<T, ListError> {
        let mut arena = self.inner.lock();
        let slot = arena
            .head
            .ok_or(ListError::InvalidIndex { index: 0, len: 0 })?;
        Ok(arena.remove(slot))
    }

    pub fn remove_last(&self) -> Result<T, ListError> {
        let mut arena = self.inner.lock();
        let slot = arena
            .tail
            .ok_or(ListError::InvalidIndex { index: 0, len: 0 })?;
        Ok(arena.remove(slot))
    }

    /// Moves the element at `from_index` to the front. No-op for index 0.
    pub fn move_to_first(&self, from_index: usize) -> Result<(), ListError> {
        let mut arena = self.inner.lock();
        let slot = arena.slot_at(from_index)?;
        arena.move_front(slot);
        Ok(())
    }

    /// Moves a node to the front in O(1).
    pub fn move_node_to_front(&self, id: NodeId) -> Result<(), ListError> {
        let mut arena = self.inner.lock();
        let slot = arena.resolve(id)?;
        arena.move_front(slot);
        Ok(())
    }

    /// Removes a node in O(1) and returns its value.
    pub fn remove_node(&self, id: NodeId) -> Result<T, ListError> {
        let mut arena = self.inner.lock();
        let slot = arena.resolve(id)?;
        Ok(arena.remove(slot))
    }

    /// Returns true while `id` refers to a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.inner.lock().resolve(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().len == 0
    }
}

impl<T: Clone> RecencyList<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        let arena = self.inner.lock();
        let slot = arena.slot_at(index).ok()?;
        Some(arena.node(slot).value.clone())
    }

    pub fn first(&self) -> Option<T> {
        let arena = self.inner.lock();
        arena.head.map(|slot| arena.node(slot).value.clone())
    }

    pub fn last(&self) -> Option<T> {
        let arena = self.inner.lock();
        arena.tail.map(|slot| arena.node(slot).value.clone())
    }

    /// Copies the elements from front to back.
    pub fn to_vec(&self) -> Vec<T> {
        let arena = self.inner.lock();
        let mut values = Vec::with_capacity(arena.len);
        let mut current = arena.head;
        while let Some(slot) = current {
            let node = arena.node(slot);
            values.push(node.value.clone());
            current = node.next;
        }
        values
    }
}
