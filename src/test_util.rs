#![cfg(test)]

use std::cell::Cell;

pub struct DropCounter {
    count: Cell<usize>,
}

impl DropCounter {
    pub fn new() -> Self {
        DropCounter {
            count: Cell::new(0),
        }
    }

    pub fn drop_count(&self) -> usize {
        self.count.get()
    }

    pub fn new_value(&self) -> DroppableValue<'_> {
        DroppableValue(self)
    }
}

/// A weight that reports to its counter when dropped.  Clones report too.
#[derive(Clone)]
pub struct DroppableValue<'a>(&'a DropCounter);

impl PartialEq for DroppableValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl std::fmt::Debug for DroppableValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DroppableValue")
    }
}

impl<'a> Drop for DroppableValue<'a> {
    fn drop(&mut self) {
        self.0.count.set(self.0.count.get() + 1);
    }
}
