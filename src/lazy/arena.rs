// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Reference-counted storage for the nodes of lazy expressions.
//!
//! Nodes are addressed by [`NodeId`]s: a slot index plus the generation the
//! slot had when the node was inserted.  Freed slots are reused with a bumped
//! generation, so an id that outlived its node never resolves to an
//! unrelated one.
//!
//! A node's count covers user handles and pending parent nodes.  When it
//! drops to zero the slot is freed and the references the node held on its
//! own operands are released in turn.

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use super::node::Node;
use crate::traits::GroupElement;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Entry<E: GroupElement> {
    node: Arc<Node<E>>,
    refs: usize,
}

struct Slot<E: GroupElement> {
    generation: u32,
    entry: Option<Entry<E>>,
}

struct Slab<E: GroupElement> {
    slots: Vec<Slot<E>>,
    free: Vec<u32>,
    live: usize,
}

impl<E: GroupElement> Slab<E> {
    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry<E>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    fn entry(&self, id: NodeId) -> Option<&Entry<E>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }
}

pub(crate) struct Arena<E: GroupElement> {
    slab: Mutex<Slab<E>>,
}

impl<E: GroupElement> Arena<E> {
    pub(crate) fn new() -> Self {
        Arena {
            slab: Mutex::new(Slab {
                slots: Vec::new(),
                free: Vec::new(),
                live: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slab<E>> {
        self.slab.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `node` with a count of one, owned by the caller.
    pub(crate) fn insert(&self, node: Node<E>) -> NodeId {
        let mut slab = self.lock();
        let entry = Some(Entry {
            node: Arc::new(node),
            refs: 1,
        });
        slab.live += 1;
        match slab.free.pop() {
            Some(index) => {
                let slot = &mut slab.slots[index as usize];
                slot.entry = entry;
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = slab.slots.len() as u32;
                slab.slots.push(Slot { generation: 0, entry });
                NodeId { index, generation: 0 }
            }
        }
    }

    /// Look up a live node.
    pub(crate) fn get(&self, id: NodeId) -> Option<Arc<Node<E>>> {
        self.lock().entry(id).map(|e| e.node.clone())
    }

    /// Current reference count of `id`, zero for freed ids.
    pub(crate) fn refs(&self, id: NodeId) -> usize {
        self.lock().entry(id).map_or(0, |e| e.refs)
    }

    pub(crate) fn retain(&self, id: NodeId) {
        if let Some(entry) = self.lock().entry_mut(id) {
            entry.refs += 1;
        }
    }

    /// Drop one reference to `id`, freeing every node that becomes
    /// unreferenced as a result.
    pub(crate) fn release(&self, id: NodeId) {
        let mut queue = vec![id];
        while let Some(id) = queue.pop() {
            let freed = {
                let mut slab = self.lock();
                let Some(entry) = slab.entry_mut(id) else {
                    continue;
                };
                entry.refs -= 1;
                if entry.refs > 0 {
                    continue;
                }
                let slot = &mut slab.slots[id.index as usize];
                let entry = slot.entry.take();
                slot.generation = slot.generation.wrapping_add(1);
                slab.free.push(id.index);
                slab.live -= 1;
                entry
            };
            // The slab lock must be released before touching node state.
            if let Some(entry) = freed {
                trace!(node = ?id, "freed");
                queue.extend(entry.node.held_operands());
            }
        }
    }

    /// Number of nodes currently stored.
    pub(crate) fn live(&self) -> usize {
        self.lock().live
    }
}
