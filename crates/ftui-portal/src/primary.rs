#![forbid(unsafe_code)]

//! Contending registrations with a single "primary" winner.
//!
//! # Design
//!
//! [`PrimaryTracker<T>`] keeps every registered value keyed by a fresh
//! [`EntryId`] in a `BTreeMap`. Ids are minted from a monotonic counter, so
//! the map's key order is registration order and the first key is always the
//! earliest still-present entry. That entry is the primary.
//!
//! The tracker owns a change callback. It fires exactly when the identity of
//! the primary changes:
//!
//! ```text
//! store(a)      primary: none -> a     on_change(Some(a))
//! store(b)      primary: a             (no call)
//! drop(reg_b)   primary: a             (no call)
//! drop(reg_a)   primary: a -> none     on_change(None)
//! ```
//!
//! # Invariants
//!
//! 1. `primary` is `None` iff the map is empty.
//! 2. `primary` is always the smallest key in the map.
//! 3. The callback runs after every internal borrow is released, so it may
//!    re-enter the tracker (store or deregister) without panicking.
//!
//! # Failure Modes
//!
//! - **Forgotten registration**: a [`Registration`] passed to
//!   `std::mem::forget` keeps its entry alive for the tracker's lifetime.
//! - **Outlived tracker**: deregistering after the tracker was dropped is a
//!   no-op.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::entry::EntryId;

type ChangeFn<T> = Rc<dyn Fn(Option<T>)>;

struct TrackerState<T> {
    entries: BTreeMap<EntryId, T>,
    primary: Option<EntryId>,
}

impl<T: Clone> TrackerState<T> {
    /// Elect a new primary after `removed` left the map. Returns
    /// `Some(next_primary_value)` when the primary moved.
    fn promote_after(&mut self, removed: EntryId) -> Option<Option<T>> {
        if self.primary != Some(removed) {
            return None;
        }
        let next = self
            .entries
            .first_key_value()
            .map(|(key, value)| (*key, value.clone()));
        self.primary = next.as_ref().map(|(key, _)| *key);
        debug_assert!(self.primary.is_some() || self.entries.is_empty());
        Some(next.map(|(_, value)| value))
    }
}

/// Registry of contending values for one role, electing the earliest as
/// primary.
///
/// `T` is cloned when it is handed to the change callback or read with
/// [`get`](Self::get); use an `Rc` for content that is expensive to clone.
pub struct PrimaryTracker<T> {
    state: Rc<RefCell<TrackerState<T>>>,
    on_change: ChangeFn<T>,
}

impl<T: fmt::Debug> fmt::Debug for PrimaryTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PrimaryTracker")
            .field("len", &state.entries.len())
            .field("primary", &state.primary)
            .finish()
    }
}

impl<T: Clone + 'static> PrimaryTracker<T> {
    /// Create an empty tracker. `on_change` receives the new primary value
    /// (or `None`) each time the primary entry changes.
    #[must_use]
    pub fn new(on_change: impl Fn(Option<T>) + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(TrackerState {
                entries: BTreeMap::new(),
                primary: None,
            })),
            on_change: Rc::new(on_change),
        }
    }

    /// Register `value` as a new contender.
    ///
    /// If the tracker had no primary, the new entry becomes primary and the
    /// change callback fires before this returns.
    #[must_use = "dropping the Registration immediately deregisters the value"]
    pub fn store(&self, value: T) -> Registration {
        let id = EntryId::next();
        let promoted = {
            let mut state = self.state.borrow_mut();
            let promoted = state.primary.is_none().then(|| value.clone());
            state.entries.insert(id, value);
            if promoted.is_some() {
                state.primary = Some(id);
            }
            promoted
        };
        if let Some(value) = promoted {
            (self.on_change)(Some(value));
        }

        let state = Rc::downgrade(&self.state);
        let on_change = Rc::clone(&self.on_change);
        Registration::new(id, move || remove_entry(&state, &on_change, id))
    }

    /// Clone of the primary value, or `None` when nothing is registered.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        let state = self.state.borrow();
        state.primary.and_then(|id| state.entries.get(&id).cloned())
    }

    /// Access the primary value by reference without cloning.
    ///
    /// The tracker is borrowed while `f` runs; do not register from inside it.
    pub fn with_primary<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let state = self.state.borrow();
        f(state.primary.and_then(|id| state.entries.get(&id)))
    }

    /// True iff no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Number of registered entries, primary included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Identity of the current primary entry.
    #[must_use]
    pub fn primary_id(&self) -> Option<EntryId> {
        self.state.borrow().primary
    }
}

fn remove_entry<T: Clone>(
    state: &Weak<RefCell<TrackerState<T>>>,
    on_change: &ChangeFn<T>,
    id: EntryId,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let (removed, moved) = {
        let mut state = state.borrow_mut();
        let removed = state.entries.remove(&id);
        let moved = removed.as_ref().and_then(|_| state.promote_after(id));
        (removed, moved)
    };
    if let Some(next) = moved {
        on_change(next);
    }
    // Released unborrowed and after the notification: the value may own
    // registrations whose teardown is a separate event.
    drop(removed);
}

/// Handle returned by [`PrimaryTracker::store`].
///
/// Calling [`deregister`](Self::deregister) (or dropping the handle) removes
/// exactly the entry it was minted for. Only the first call has an effect.
pub struct Registration {
    id: EntryId,
    remove: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Registration {
    fn new(id: EntryId, remove: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            remove: Cell::new(Some(Box::new(remove))),
        }
    }

    /// Identity of the registered entry.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Whether [`deregister`](Self::deregister) has not run yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let remove = self.remove.take();
        let active = remove.is_some();
        self.remove.set(remove);
        active
    }

    /// Remove the entry from its tracker. Idempotent.
    pub fn deregister(&self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.deregister();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
