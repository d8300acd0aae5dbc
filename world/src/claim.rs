use std::collections::VecDeque;

use bubble_shooter_core::BubbleId;

/// Bounded line of bubbles waiting to be loaded; the oldest leaves first.
#[derive(Clone, Debug)]
pub(crate) struct ClaimQueue {
    capacity: usize,
    slots: VecDeque<BubbleId>,
}

impl ClaimQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: VecDeque::with_capacity(capacity),
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Queues `bubble` behind the waiting ones. Returns `false` when full.
    pub(crate) fn push(&mut self, bubble: BubbleId) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots.push_front(bubble);
        true
    }

    pub(crate) fn pop(&mut self) -> Option<BubbleId> {
        self.slots.pop_back()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Waiting bubbles, oldest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = BubbleId> + '_ {
        self.slots.iter().rev().copied()
    }
}
