//! Tracks the latest OCR request of each user so that replies to superseded
//! requests can be dropped.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::auth::UserID;

/// A per-user counter. Each new request takes the next number, and only the
/// holder of the highest number is current.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: Mutex<HashMap<UserID, u64>>,
}

impl RequestGenerations {
    /// Start a new request for `user_id`, superseding any request in flight.
    pub fn begin(&self, user_id: UserID) -> u64 {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = latest.entry(user_id).or_insert(0);
        *generation += 1;

        *generation
    }

    /// Whether `generation` is still the newest request of `user_id`.
    pub fn is_latest(&self, user_id: UserID, generation: u64) -> bool {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);

        latest.get(&user_id) == Some(&generation)
    }
}
