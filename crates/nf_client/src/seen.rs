use std::collections::{HashSet, VecDeque};

pub const DEFAULT_SEEN_CAPACITY: usize = 10_000;

/// Fingerprints of articles already shown.
///
/// Bounded by `capacity`; once full, the oldest fingerprint is evicted to make
/// room. A capacity of 0 means unbounded.
#[derive(Debug, Clone)]
pub struct SeenSet {
    capacity: usize,
    members: HashSet<String>,
    order: VecDeque<String>,
}

impl SeenSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.members.contains(fingerprint)
    }

    /// Returns `false` if the fingerprint was already present.
    pub fn insert(&mut self, fingerprint: String) -> bool {
        if self.members.contains(&fingerprint) {
            return false;
        }
        if self.capacity > 0 && self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.members.insert(fingerprint.clone());
        self.order.push_back(fingerprint);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_CAPACITY)
    }
}
