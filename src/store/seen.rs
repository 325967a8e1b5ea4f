use std::collections::{HashSet, VecDeque};

/// Message ids already evaluated, bounded FIFO: the oldest id is evicted first.
#[derive(Debug, Clone)]
pub struct SeenSet {
    capacity: usize,
    order: VecDeque<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            index: HashSet::with_capacity(capacity),
        }
    }

    /// Rebuilds from persisted ids (oldest first), keeping only the newest `capacity`.
    pub fn from_ids<I>(capacity: usize, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new(capacity);
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Returns false when the id was already present; its position is unchanged.
    pub fn insert(&mut self, id: String) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_bounded_and_keeps_most_recent() {
        let mut seen = SeenSet::new(3);
        for i in 0..5 {
            assert!(seen.insert(format!("m{i}")));
        }
        assert_eq!(seen.len(), 3);
        let kept: Vec<_> = seen.iter().cloned().collect();
        assert_eq!(kept, vec!["m2", "m3", "m4"]);
        assert!(!seen.contains("m0"));
        assert!(!seen.contains("m1"));
    }

    #[test]
    fn duplicates_do_not_refresh_position() {
        let mut seen = SeenSet::new(2);
        seen.insert("a".into());
        seen.insert("b".into());
        assert!(!seen.insert("a".into()));
        seen.insert("c".into());
        assert!(!seen.contains("a"));
        assert!(seen.contains("b") && seen.contains("c"));
    }

    #[test]
    fn reload_truncates_to_capacity() {
        let ids = (0..10).map(|i| i.to_string());
        let seen = SeenSet::from_ids(4, ids);
        let kept: Vec<_> = seen.iter().map(String::as_str).collect();
        assert_eq!(kept, ["6", "7", "8", "9"]);
    }
}
