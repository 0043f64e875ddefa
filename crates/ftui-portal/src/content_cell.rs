#![forbid(unsafe_code)]

//! What a portal target currently shows.
//!
//! A [`TargetBinding`] writes every [`Delivery`] it receives into a
//! [`ContentCell`]. The widget that draws the target reads the cell during
//! render and compares [`version`](ContentCell::version) with the version it
//! last drew to decide whether the region is dirty.
//!
//! Writes are not deduplicated. A channel redelivers the current source
//! whenever its primary target changes, and each redelivery is a real event
//! for the drawing widget (it may have just become visible), so every
//! [`set`](ContentCell::set) counts as a write and reaches every watcher.
//!
//! Watchers are held weakly; the strong half lives in the [`Subscription`]
//! returned to the caller. The cell is not borrowed while watchers run, so a
//! watcher may read the cell, write it again, or drop its own subscription.
//!
//! A write walks every watcher slot, sweeping those whose subscription is
//! gone. A target normally has one or two watchers (its own widget plus a
//! debug overlay).
//!
//! [`TargetBinding`]: crate::TargetBinding
//! [`Delivery`]: crate::Delivery

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct RenderState<T> {
    content: T,
    writes: u64,
    watchers: Vec<Weak<dyn Fn(&T)>>,
}

/// Render state of one portal target. Clones are handles to one cell, so
/// the binding writes and the widget reads the same content.
pub struct ContentCell<T> {
    state: Rc<RefCell<RenderState<T>>>,
}

impl<T> Clone for ContentCell<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ContentCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ContentCell")
            .field("content", &state.content)
            .field("writes", &state.writes)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> ContentCell<T> {
    /// Cell holding `initial` at version 0.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(RenderState {
                content: initial,
                writes: 0,
                watchers: Vec::new(),
            })),
        }
    }

    /// Clone of what the target shows now.
    #[must_use]
    pub fn get(&self) -> T {
        self.state.borrow().content.clone()
    }

    /// Read the content in place, e.g. to draw it without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow().content)
    }

    /// Store `content` as a new write, then run the watchers with it.
    pub fn set(&self, content: T) {
        {
            let mut state = self.state.borrow_mut();
            state.content = content;
            state.writes += 1;
        }
        self.broadcast();
    }

    /// Number of writes since creation. A widget that remembers the version
    /// it last drew is dirty whenever this differs.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.borrow().writes
    }

    /// Run `watcher` after every write until the [`Subscription`] is
    /// dropped.
    pub fn subscribe(&self, watcher: impl Fn(&T) + 'static) -> Subscription {
        let watcher: Rc<dyn Fn(&T)> = Rc::new(watcher);
        self.state.borrow_mut().watchers.push(Rc::downgrade(&watcher));
        Subscription {
            _watcher: Box::new(watcher),
        }
    }

    /// Watcher slots, counting dropped subscriptions until the next write
    /// sweeps them.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.state.borrow().watchers.len()
    }

    fn broadcast(&self) {
        let (live, content) = {
            let mut state = self.state.borrow_mut();
            let mut live = Vec::with_capacity(state.watchers.len());
            state.watchers.retain(|weak| match weak.upgrade() {
                Some(watcher) => {
                    live.push(watcher);
                    true
                }
                None => false,
            });
            (live, state.content.clone())
        };
        for watcher in live {
            watcher(&content);
        }
    }
}

/// Keeps a [`ContentCell`] watcher alive; dropping it detaches the watcher.
#[must_use = "dropping the Subscription detaches the watcher"]
pub struct Subscription {
    _watcher: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
