//! Deduplication of concurrent add requests
//!
//! While a trackable's connect is outstanding, further add or track requests for
//! the same id park their completions here instead of connecting again. When the
//! connect resolves every parked completion receives that one result, in the
//! order it was saved.

use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use trackcast_core::{Completion, PublisherResult};

type PendingCompletions = SmallVec<[Completion<()>; 2]>;

#[derive(Debug, Default)]
pub struct DuplicateTrackableGuard {
    in_flight: HashSet<String>,
    pending: HashMap<String, PendingCompletions>,
}

impl DuplicateTrackableGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the trackable's connect as outstanding
    pub fn start_adding(&mut self, trackable_id: &str) {
        self.in_flight.insert(trackable_id.to_string());
    }

    pub fn is_in_flight(&self, trackable_id: &str) -> bool {
        self.in_flight.contains(trackable_id)
    }

    /// Park a completion until the outstanding connect resolves
    pub fn save_completion(&mut self, trackable_id: &str, completion: Completion<()>) {
        debug_assert!(self.is_in_flight(trackable_id));
        self.pending
            .entry(trackable_id.to_string())
            .or_default()
            .push(completion);
    }

    /// Resolve every parked completion with the connect result
    pub fn finish_adding(&mut self, trackable_id: &str, result: PublisherResult<()>) {
        self.in_flight.remove(trackable_id);
        let completions = self.pending.remove(trackable_id).unwrap_or_default();
        for completion in completions {
            completion.complete(result.clone());
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
