//! Per-binding storage of constructed instances. Each slot moves from unresolved, through
//! resolving, to resolved. A construction which fails or panics puts the slot back into the
//! unresolved state, so it can be retried.

use crate::error::InjectorError;
use crate::instance_provider::InstanceAnyPtr;
use crate::key::TypeKey;
#[cfg(not(feature = "threadsafe"))]
use std::cell::RefCell;
#[cfg(feature = "threadsafe")]
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};

#[derive(Default)]
enum SlotState {
    #[default]
    Unresolved,
    Resolving(ThreadId),
    Resolved(InstanceAnyPtr),
}

#[cfg(feature = "threadsafe")]
#[derive(Default)]
pub(crate) struct InstanceSlot {
    state: Mutex<SlotState>,
    resolved: Condvar,
}

#[cfg(not(feature = "threadsafe"))]
#[derive(Default)]
pub(crate) struct InstanceSlot {
    state: RefCell<SlotState>,
}

pub(crate) enum SlotClaim<'a> {
    /// The instance has already been constructed.
    Resolved(InstanceAnyPtr),
    /// The caller is now responsible for constructing the instance.
    Owned(SlotGuard<'a>),
}

/// Exclusive right to construct the instance for a slot.
pub(crate) struct SlotGuard<'a> {
    slot: &'a InstanceSlot,
    published: bool,
}

impl SlotGuard<'_> {
    pub(crate) fn publish(mut self, instance: InstanceAnyPtr) -> InstanceAnyPtr {
        self.slot.set_state(SlotState::Resolved(instance.clone()));
        self.published = true;
        instance
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.slot.set_state(SlotState::Unresolved);
        }
    }
}

#[cfg(feature = "threadsafe")]
impl InstanceSlot {
    /// Returns the stored instance or claims the slot for construction. Blocks while another
    /// thread is constructing the instance. Claiming a slot which is being resolved by the current
    /// thread means there's a cycle.
    pub(crate) fn claim(&self, key: &TypeKey) -> Result<SlotClaim<'_>, InjectorError> {
        let current = thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            let owner = match &*state {
                SlotState::Resolved(instance) => return Ok(SlotClaim::Resolved(instance.clone())),
                SlotState::Unresolved => break,
                SlotState::Resolving(owner) => *owner,
            };

            if owner == current {
                return Err(InjectorError::DependencyCycle(*key));
            }

            state = self
                .resolved
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        *state = SlotState::Resolving(current);
        Ok(SlotClaim::Owned(SlotGuard {
            slot: self,
            published: false,
        }))
    }

    fn set_state(&self, new_state: SlotState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = new_state;
        self.resolved.notify_all();
    }
}

#[cfg(not(feature = "threadsafe"))]
impl InstanceSlot {
    /// Returns the stored instance or claims the slot for construction. Claiming a slot which is
    /// being resolved means there's a cycle.
    pub(crate) fn claim(&self, key: &TypeKey) -> Result<SlotClaim<'_>, InjectorError> {
        let mut state = self.state.borrow_mut();
        match &*state {
            SlotState::Resolved(instance) => Ok(SlotClaim::Resolved(instance.clone())),
            SlotState::Resolving(_) => Err(InjectorError::DependencyCycle(*key)),
            SlotState::Unresolved => {
                *state = SlotState::Resolving(thread::current().id());
                Ok(SlotClaim::Owned(SlotGuard {
                    slot: self,
                    published: false,
                }))
            }
        }
    }

    fn set_state(&self, new_state: SlotState) {
        *self.state.borrow_mut() = new_state;
    }
}
