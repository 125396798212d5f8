use std::collections::HashSet;

use crate::{JobId, JobPatch, JobResult, JobStatus};

/// Ordered entries backing the current page, unique by [`JobId`].
///
/// Every operation that changes the contents bumps [`ResultStore::revision`]
/// exactly once, which is the notification the view layer observes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultStore {
    entries: Vec<JobResult>,
    revision: u64,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobResult> {
        self.entries.iter()
    }

    pub fn get(&self, id: &JobId) -> Option<&JobResult> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.position(id).is_some()
    }

    /// Prepends `entry`, or replaces the entry with the same id in place.
    /// An existing entry that is terminal, or further along than `entry`, is
    /// left alone and `false` is returned.
    pub fn insert_optimistic(&mut self, entry: JobResult) -> bool {
        match self.position(&entry.id) {
            Some(index) if !self.entries[index].status().can_advance_to(entry.status()) => {
                return false
            }
            Some(index) => self.entries[index] = entry,
            None => self.entries.insert(0, entry),
        }
        self.notify();
        true
    }

    /// Replaces the contents with an authoritative page, keeping server order.
    ///
    /// Duplicate ids in `incoming` keep their first occurrence. When a local
    /// entry is further along than the incoming copy, the local one is kept.
    pub fn merge(&mut self, incoming: Vec<JobResult>) {
        self.merge_superseding(incoming, |_| false);
    }

    /// Like [`ResultStore::merge`], except that a local entry for which
    /// `superseded` returns `true` gives way to an incoming `completed` copy.
    pub fn merge_superseding(
        &mut self,
        incoming: Vec<JobResult>,
        superseded: impl Fn(&JobId) -> bool,
    ) {
        let mut seen = HashSet::with_capacity(incoming.len());
        let mut merged = Vec::with_capacity(incoming.len());
        for entry in incoming {
            if !seen.insert(entry.id.clone()) {
                continue;
            }
            let keep_local = self
                .get(&entry.id)
                .filter(|local| local.status() != entry.status())
                .filter(|local| !local.status().can_advance_to(entry.status()))
                .filter(|_| !(entry.status() == JobStatus::Completed && superseded(&entry.id)))
                .cloned();
            merged.push(keep_local.unwrap_or(entry));
        }
        self.entries = merged;
        self.notify();
    }

    /// Applies `patch` to the entry with `id`. Returns `false` without notifying
    /// when the entry is gone or the patch does not change it.
    pub fn update_by_id(&mut self, id: &JobId, patch: JobPatch) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let changed = patch.apply_to(&mut self.entries[index]);
        if changed {
            self.notify();
        }
        changed
    }

    /// Removes the entry with `id`, returning it with its former position.
    pub fn remove_by_id(&mut self, id: &JobId) -> Option<(usize, JobResult)> {
        let index = self.position(id)?;
        let entry = self.entries.remove(index);
        self.notify();
        Some((index, entry))
    }

    /// Puts a removed entry back near its former position. Does nothing when
    /// an entry with the same id has reappeared in the meantime.
    pub fn restore(&mut self, index: usize, entry: JobResult) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.notify();
        true
    }

    fn position(&self, id: &JobId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    fn notify(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
