//! Process-wide reference-counted pool of interned grapheme clusters.
//!
//! Multi-byte clusters (emoji, ZWJ sequences, combining stacks) are interned
//! once and addressed by a small [`GraphemeHandle`] afterwards, so buffers
//! can compare and hash clusters by handle instead of by bytes.
//!
//! # Design
//!
//! - Slots store the cluster's canonical UTF-8 bytes plus its precomputed
//!   width.
//! - Handle 0 is reserved/invalid.
//! - Reference counting with a free-list for O(1) slot reuse.
//! - `FxHashMap` index for O(1) `intern` lookup.
//! - One process-wide pool behind a single mutex, initialized lazily. All
//!   pool operations are short-lived inserts or lookups.
//!
//! # Invariants
//!
//! - Refcount starts at 1 on first intern; equal byte sequences share a
//!   handle while any reference is live.
//! - `release` returns `true` while references remain, `false` once freed.
//! - `lookup` returns `None` for freed or invalid handles.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::trace;

/// Opaque identifier of an interned cluster. 0 is reserved/invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphemeHandle(u32);

impl GraphemeHandle {
    /// The reserved invalid handle.
    pub const INVALID: Self = Self(0);

    /// Raw slot index.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is a live-looking (nonzero) handle.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Pool utilization snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total allocated slots, freed included (excludes reserved slot 0).
    pub total_slots: usize,
    /// Slots currently holding a live cluster.
    pub active_slots: usize,
    /// Freed slots available for reuse.
    pub free_slots: usize,
}

#[derive(Debug)]
struct Slot {
    bytes: Arc<str>,
    refcount: u32,
    width: u8,
}

impl Slot {
    fn is_free(&self) -> bool {
        self.refcount == 0
    }
}

#[derive(Debug, Default)]
struct Pool {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    index: FxHashMap<Arc<str>, u32>,
}

impl Pool {
    fn new() -> Self {
        Self {
            // Reserve slot 0 as invalid.
            slots: vec![Slot {
                bytes: Arc::from(""),
                refcount: 0,
                width: 0,
            }],
            free_list: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn intern(&mut self, cluster: &str, width: u8) -> Result<GraphemeHandle> {
        if let Some(&id) = self.index.get(cluster) {
            if let Some(slot) = self.slots.get_mut(id as usize) {
                if !slot.is_free() {
                    slot.refcount = slot.refcount.saturating_add(1);
                    return Ok(GraphemeHandle(id));
                }
            }
            // Stale index entry for a freed slot.
            self.index.remove(cluster);
        }

        let bytes: Arc<str> = Arc::from(cluster);
        let slot = Slot {
            bytes: Arc::clone(&bytes),
            refcount: 1,
            width,
        };
        let id = if let Some(free_id) = self.free_list.pop() {
            self.slots[free_id as usize] = slot;
            free_id
        } else {
            self.slots
                .try_reserve(1)
                .map_err(|e| Error::alloc("grapheme pool", e))?;
            let id = self.slots.len() as u32;
            self.slots.push(slot);
            trace!(id, len = cluster.len(), "grapheme pool grew");
            id
        };
        self.index
            .try_reserve(1)
            .map_err(|e| Error::alloc("grapheme pool index", e))?;
        self.index.insert(bytes, id);
        Ok(GraphemeHandle(id))
    }

    fn retain(&mut self, handle: GraphemeHandle) {
        if let Some(slot) = self.slots.get_mut(handle.0 as usize) {
            if !slot.is_free() {
                slot.refcount = slot.refcount.saturating_add(1);
            }
        }
    }

    fn release(&mut self, handle: GraphemeHandle) -> bool {
        if let Some(slot) = self.slots.get_mut(handle.0 as usize) {
            if slot.refcount > 0 {
                slot.refcount -= 1;
                if slot.refcount == 0 {
                    self.index.remove(&slot.bytes);
                    slot.bytes = Arc::from("");
                    self.free_list.push(handle.0);
                    return false;
                }
                return true;
            }
        }
        false
    }

    fn lookup(&self, handle: GraphemeHandle) -> Option<(Arc<str>, u8)> {
        self.slots.get(handle.0 as usize).and_then(|slot| {
            if slot.is_free() {
                None
            } else {
                Some((Arc::clone(&slot.bytes), slot.width))
            }
        })
    }

    fn stats(&self) -> PoolStats {
        let active = self.slots.iter().skip(1).filter(|s| !s.is_free()).count();
        PoolStats {
            total_slots: self.slots.len().saturating_sub(1),
            active_slots: active,
            free_slots: self.free_list.len(),
        }
    }
}

fn pool() -> &'static Mutex<Pool> {
    static POOL: OnceLock<Mutex<Pool>> = OnceLock::new();
    POOL.get_or_init(|| Mutex::new(Pool::new()))
}

fn with_pool<R>(f: impl FnOnce(&mut Pool) -> R) -> R {
    let mut guard = pool().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut guard)
}

/// Intern a cluster's canonical bytes with its precomputed width.
///
/// Equal byte sequences share a handle; the refcount is bumped for every
/// intern, so each successful call must be balanced by one [`release`].
pub fn intern(cluster: &str, width: u8) -> Result<GraphemeHandle> {
    with_pool(|p| p.intern(cluster, width))
}

/// Add a reference to an interned cluster. No-op on invalid handles.
pub fn retain(handle: GraphemeHandle) {
    with_pool(|p| p.retain(handle));
}

/// Drop a reference. Returns `true` while references remain, `false` once
/// the slot was freed (or the handle was already invalid).
pub fn release(handle: GraphemeHandle) -> bool {
    with_pool(|p| p.release(handle))
}

/// Resolve a handle to its bytes and cached width.
#[must_use]
pub fn lookup(handle: GraphemeHandle) -> Option<(Arc<str>, u8)> {
    with_pool(|p| p.lookup(handle))
}

/// Current pool utilization.
#[must_use]
pub fn stats() -> PoolStats {
    with_pool(|p| p.stats())
}
