//! Bounded memoization of rendered outputs.
//!
//! Outputs are pure functions of their declared inputs and the dataset
//! version, so a rendered payload can be reused whenever the exact same
//! tuple comes back.

use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use super::{InputId, OutputId, OutputPayload};
use crate::db::checksum_parts;
use crate::routes::PageId;

#[derive(Default)]
struct MemoState {
    entries: HashMap<String, OutputPayload>,
    order: VecDeque<String>,
}

/// Insertion-ordered cache; the oldest entry is evicted at capacity.
pub struct MemoCache {
    capacity: usize,
    state: Mutex<MemoState>,
}

impl MemoCache {
    /// Cache holding at most `capacity` payloads. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(MemoState::default()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Cache key for one output render.
    pub fn key(
        page: PageId,
        output: OutputId,
        input: Option<InputId>,
        controls: &serde_json::Value,
        version: u64,
    ) -> String {
        let controls = controls.to_string();
        let version = version.to_string();
        let input = input.map(|i| i.as_str()).unwrap_or("initial");
        checksum_parts([page.as_str(), output.as_str(), input, controls.as_str(), version.as_str()])
    }

    pub fn get(&self, key: &str) -> Option<OutputPayload> {
        if !self.is_enabled() {
            return None;
        }
        let hit = self.state.lock().entries.get(key).cloned();
        if hit.is_some() {
            debug!("Memo hit {}", &key[..key.len().min(12)]);
        }
        hit
    }

    pub fn insert(&self, key: String, payload: OutputPayload) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.lock();
        if state.entries.contains_key(&key) {
            state.entries.insert(key, payload);
            return;
        }
        while state.order.len() >= self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, payload);
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
