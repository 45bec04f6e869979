//! FIFO of image names for `run --save`
//!
//! A circular buffer that grows by its initial capacity whenever it fills up.

use std::fmt;

#[derive(Debug, Clone)]
pub struct NameQueue {
    slots: Vec<Option<String>>,
    increment: usize,
    head: usize,
    tail: usize,
    count: usize,
}

impl NameQueue {
    /// Create a queue with room for `capacity` names before it has to grow
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            increment: capacity.max(1),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Queue of the comma-separated names given on the command line, in order
    pub fn from_list(list: &str) -> Self {
        let names: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        let mut queue = Self::with_capacity(names.len());
        for name in names {
            queue.push(name.to_string());
        }
        queue
    }

    pub fn push(&mut self, name: String) {
        if self.count == self.slots.len() {
            self.grow();
        }
        self.slots[self.tail] = Some(name);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
    }

    /// Remove and return the oldest name
    pub fn pop(&mut self) -> Option<String> {
        if self.count == 0 {
            return None;
        }
        let name = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        name
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    // Unrolls the ring so the oldest element lands at index 0.
    fn grow(&mut self) {
        let old_len = self.slots.len();
        let mut slots = Vec::with_capacity(old_len + self.increment);
        slots.extend(self.slots.drain(self.head..));
        slots.extend(self.slots.drain(..));
        slots.resize(old_len + self.increment, None);
        self.slots = slots;
        self.head = 0;
        self.tail = old_len;
    }
}

impl Default for NameQueue {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl fmt::Display for NameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending: Vec<&str> = (0..self.count)
            .filter_map(|offset| self.slots[(self.head + offset) % self.slots.len()].as_deref())
            .collect();
        write!(f, "[{}]", pending.join(", "))
    }
}
