//! Ownership of effect instances, keyed by the id a host stores per node.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::foundation::error::{RasterFxError, RasterFxResult};
use crate::fx::contract::Effect;
use crate::host::{InstanceId, NodeId};

/// An effect instance and the node that created it.
pub struct InstanceSlot {
    owner: NodeId,
    effect: Mutex<Box<dyn Effect>>,
}

impl InstanceSlot {
    /// Node that created the instance.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Exclusive access to the instance for one lifecycle or compute step.
    pub fn lock(&self) -> RasterFxResult<MutexGuard<'_, Box<dyn Effect>>> {
        self.effect
            .lock()
            .map_err(|_| RasterFxError::instance("effect instance lock poisoned"))
    }
}

/// Result of asking the registry to drop an instance on behalf of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The instance was dropped.
    Removed,
    /// The instance belongs to another node (the caller is a clone); it was kept.
    NotOwner(NodeId),
    /// No instance has this id.
    Missing,
}

/// Owns every live effect instance of one plugin, keyed by the id stored in host user data.
#[derive(Default)]
pub struct InstanceRegistry {
    next: AtomicU64,
    slots: RwLock<HashMap<InstanceId, Arc<InstanceSlot>>>,
}

impl InstanceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `effect` as owned by `owner` and return its fresh id.
    pub fn insert(&self, owner: NodeId, effect: Box<dyn Effect>) -> RasterFxResult<InstanceId> {
        let id = InstanceId(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        let slot = Arc::new(InstanceSlot {
            owner,
            effect: Mutex::new(effect),
        });
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RasterFxError::instance("instance registry poisoned"))?;
        let prev = slots.insert(id, slot);
        debug_assert!(prev.is_none(), "instance id {id:?} reused");
        Ok(id)
    }

    /// Slot for `id`, if still registered.
    pub fn get(&self, id: InstanceId) -> Option<Arc<InstanceSlot>> {
        let slots = self.slots.read().ok()?;
        slots.get(&id).cloned()
    }

    /// Drop the instance only if `node` created it.
    pub fn remove_if_owner(&self, id: InstanceId, node: NodeId) -> RasterFxResult<Removal> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RasterFxError::instance("instance registry poisoned"))?;
        let owner = match slots.get(&id) {
            Some(slot) => slot.owner,
            None => return Ok(Removal::Missing),
        };
        if owner != node {
            return Ok(Removal::NotOwner(owner));
        }
        slots.remove(&id);
        Ok(Removal::Removed)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Return `true` when no instance is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fx/registry.rs"]
mod tests;
