// src/crawl/visited.rs
// =============================================================================
// The set of identifiers that have already been dispatched in one crawl.
//
// Only the coordinator touches this set, from its single processing loop,
// so it is a plain HashSet with no locking. Task runners never see it.
//
// An identifier is marked when its task is spawned, not when its fetch
// completes. Marking on completion would leave a window where two outcomes
// that both link to X get processed before X's own outcome comes back,
// and X would be fetched twice.
// =============================================================================

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug)]
pub struct VisitedSet<Id> {
    seen: HashSet<Id>,
}

impl<Id: Eq + Hash> VisitedSet<Id> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.seen.contains(id)
    }

    // Marks an identifier. Idempotent.
    //
    // Returns true only the first time a given identifier is marked, which
    // makes this the check-and-mark step used before every dispatch.
    pub fn mark(&mut self, id: Id) -> bool {
        self.seen.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<Id: Eq + Hash> Default for VisitedSet<Id> {
    fn default() -> Self {
        Self::new()
    }
}
