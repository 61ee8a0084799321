use crate::models::{EntryId, ResumeRecord};

/// Source of entry ids. Injected into the store so ids never depend on
/// wall-clock time.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> EntryId;

    /// Called whenever the store adopts a record it did not build itself,
    /// so later ids stay clear of the ones already present.
    fn observe(&mut self, record: &ResumeRecord);
}

/// Strictly increasing counter, always above every id it has observed.
#[derive(Debug, Clone)]
pub struct MonotonicIds {
    next: EntryId,
}

impl Default for MonotonicIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator for MonotonicIds {
    fn next_id(&mut self) -> EntryId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    fn observe(&mut self, record: &ResumeRecord) {
        self.next = self.next.max(record.max_entry_id().saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_skips_observed_ids() {
        let mut ids = MonotonicIds::default();
        ids.observe(&ResumeRecord::scaffold());
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_observe_never_moves_backwards() {
        let mut ids = MonotonicIds::default();
        for _ in 0..10 {
            ids.next_id();
        }
        ids.observe(&ResumeRecord::default());
        assert_eq!(ids.next_id(), 11);
    }
}
