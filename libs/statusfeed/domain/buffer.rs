use super::event::{EventKind, StreamEvent};
use std::collections::VecDeque;

/// Default number of events kept
pub const DEFAULT_BUFFER_CAPACITY: usize = 50;

/// Bounded store of recent events, oldest first
///
/// Appending past capacity evicts from the front, so the buffer always holds
/// the most recent `capacity` events in arrival order.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: VecDeque<StreamEvent>,
    capacity: usize,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// A capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event, returning the one evicted to make room, if any
    pub fn push(&mut self, event: StreamEvent) -> Option<StreamEvent> {
        let evicted = if self.events.len() >= self.capacity {
            self.events.pop_front()
        } else {
            None
        };
        self.events.push_back(event);
        evicted
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StreamEvent> + ExactSizeIterator {
        self.events.iter()
    }

    pub fn first(&self) -> Option<&StreamEvent> {
        self.events.front()
    }

    pub fn last(&self) -> Option<&StreamEvent> {
        self.events.back()
    }

    pub fn count_of(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Most recently appended event of `kind`
    pub fn latest_of(&self, kind: EventKind) -> Option<&StreamEvent> {
        self.events.iter().rev().find(|e| e.kind() == kind)
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a EventBuffer {
    type Item = &'a StreamEvent;
    type IntoIter = std::collections::vec_deque::Iter<'a, StreamEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
