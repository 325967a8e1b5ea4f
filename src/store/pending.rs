use crate::domain::{Message, PendingItem, PendingStatus};

use super::seen::SeenSet;

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Identity already evaluated (or still awaiting a decision); nothing ran.
    AlreadySeen,
    Clean,
    Pending(PendingItem),
}

/// In-memory view of the durable state: the seen set plus items awaiting a decision.
#[derive(Debug, Clone)]
pub struct PendingStore {
    seen: SeenSet,
    pending: Vec<PendingItem>,
}

impl PendingStore {
    pub fn new(seen: SeenSet, pending: Vec<PendingItem>) -> Self {
        let mut store = Self {
            seen,
            pending: Vec::with_capacity(pending.len()),
        };
        for item in pending {
            store.push(item);
        }
        store
    }

    pub fn empty(seen_capacity: usize) -> Self {
        Self::new(SeenSet::new(seen_capacity), Vec::new())
    }

    /// Runs `classify` at most once per identity. The identity is marked seen
    /// whatever the verdict; `classify` returns an item only for prospection.
    pub fn ingest<F>(&mut self, message: &Message, classify: F) -> IngestOutcome
    where
        F: FnOnce(&Message) -> Option<PendingItem>,
    {
        if self.seen.contains(&message.id) || self.get(&message.id).is_some() {
            self.seen.insert(message.id.clone());
            return IngestOutcome::AlreadySeen;
        }

        let outcome = match classify(message) {
            Some(item) if self.push(item.clone()) => IngestOutcome::Pending(item),
            Some(_) => IngestOutcome::AlreadySeen,
            None => IngestOutcome::Clean,
        };
        self.seen.insert(message.id.clone());
        outcome
    }

    pub fn get(&self, message_id: &str) -> Option<&PendingItem> {
        self.pending.iter().find(|item| item.message_id == message_id)
    }

    pub fn remove(&mut self, message_id: &str) -> Option<PendingItem> {
        let position = self
            .pending
            .iter()
            .position(|item| item.message_id == message_id)?;
        Some(self.pending.remove(position))
    }

    pub fn set_status(&mut self, message_id: &str, status: PendingStatus) -> bool {
        match self
            .pending
            .iter_mut()
            .find(|item| item.message_id == message_id)
        {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    pub fn pending(&self) -> &[PendingItem] {
        &self.pending
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    fn push(&mut self, item: PendingItem) -> bool {
        if self.get(&item.message_id).is_some() {
            tracing::warn!(
                target: "store",
                message_id = %item.message_id,
                "duplicate pending item dropped"
            );
            return false;
        }
        self.pending.push(item);
        true
    }
}
