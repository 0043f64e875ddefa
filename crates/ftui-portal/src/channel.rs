#![forbid(unsafe_code)]

//! A named pairing of contending sources and contending targets.
//!
//! # Design
//!
//! A [`Channel<T>`] owns two [`PrimaryTracker`]s: one of content values
//! (sources) and one of delivery callbacks (targets). Both trackers share the
//! same change callback, `update`, which runs synchronously whenever either
//! primary changes:
//!
//! ```text
//! primary target?  ── yes ──> target(Content(primary source) | Vacant)
//!        │
//!        no
//!        │
//! sources empty?   ── yes ──> destructor()
//!        │
//!        no ──> (nothing to do)
//! ```
//!
//! The trackers reach the channel through a `Weak`, so a channel is freed as
//! soon as its owner (normally a [`ChannelRegistry`]) lets go of it.
//!
//! # Invariants
//!
//! 1. Exactly one `update` per change of either primary; no batching.
//! 2. A primary target with no source receives [`Delivery::Vacant`].
//! 3. Every change of primary target redelivers the current source value,
//!    even when the value did not change.
//! 4. The destructor runs only when there is no target and no source.
//!
//! [`ChannelRegistry`]: crate::ChannelRegistry

use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::config::PortalConfig;
use crate::delivery::Delivery;
use crate::primary::{PrimaryTracker, Registration};

/// Callback registered by a target.
pub type TargetFn<T> = Rc<dyn Fn(Delivery<T>)>;

static NEXT_CHANNEL: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_channel_id() -> u64 {
    NEXT_CHANNEL.fetch_add(1, Ordering::Relaxed)
}

struct ChannelInner<T> {
    id: u64,
    name: Rc<str>,
    trace_deliveries: bool,
    sources: PrimaryTracker<T>,
    targets: PrimaryTracker<TargetFn<T>>,
    destructor: Box<dyn Fn()>,
}

impl<T: Clone + 'static> ChannelInner<T> {
    fn update(&self) {
        if let Some(target) = self.targets.get() {
            let delivery = Delivery::from(self.sources.get());
            if self.trace_deliveries {
                trace!(
                    channel = %self.name,
                    channel_id = self.id,
                    vacant = delivery.is_vacant(),
                    "portal delivery"
                );
            }
            target(delivery);
        } else if self.sources.is_empty() {
            debug!(channel = %self.name, channel_id = self.id, "portal channel emptied");
            (self.destructor)();
        }
    }
}

/// Handle to a portal channel.
///
/// Cloning a `Channel` creates a new handle to the **same** channel.
pub struct Channel<T> {
    inner: Rc<ChannelInner<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("sources", &self.inner.sources.len())
            .field("targets", &self.inner.targets.len())
            .field("primary_source", &self.inner.sources.get())
            .finish()
    }
}

impl<T: Clone + 'static> Channel<T> {
    /// Create a standalone channel. `destructor` runs each time the channel
    /// is left with no sources and no targets.
    #[must_use]
    pub fn new(name: impl Into<Rc<str>>, destructor: impl Fn() + 'static) -> Self {
        Self::with_config(name, &PortalConfig::default(), destructor)
    }

    pub(crate) fn with_config(
        name: impl Into<Rc<str>>,
        config: &PortalConfig,
        destructor: impl Fn() + 'static,
    ) -> Self {
        Self::with_id(next_channel_id(), name, config, destructor)
    }

    pub(crate) fn with_id(
        id: u64,
        name: impl Into<Rc<str>>,
        config: &PortalConfig,
        destructor: impl Fn() + 'static,
    ) -> Self {
        let name = name.into();
        debug!(channel = %name, channel_id = id, "portal channel created");
        let inner = Rc::new_cyclic(|weak: &Weak<ChannelInner<T>>| {
            let on_source = {
                let weak = weak.clone();
                move |_: Option<T>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.update();
                    }
                }
            };
            let on_target = {
                let weak = weak.clone();
                move |_: Option<TargetFn<T>>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.update();
                    }
                }
            };
            ChannelInner {
                id,
                name,
                trace_deliveries: config.trace_deliveries,
                sources: PrimaryTracker::new(on_source),
                targets: PrimaryTracker::new(on_target),
                destructor: Box::new(destructor),
            }
        });
        Self { inner }
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Process-unique channel id. A channel recreated under the same name
    /// gets a new id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Source tracker. Register content with [`PrimaryTracker::store`].
    #[must_use]
    pub fn sources(&self) -> &PrimaryTracker<T> {
        &self.inner.sources
    }

    /// Target tracker. Register delivery callbacks with
    /// [`PrimaryTracker::store`].
    #[must_use]
    pub fn targets(&self) -> &PrimaryTracker<TargetFn<T>> {
        &self.inner.targets
    }

    /// Register `content` as a source.
    #[must_use = "dropping the Registration immediately deregisters the source"]
    pub fn register_source(&self, content: T) -> Registration {
        self.inner.sources.store(content)
    }

    /// Register `callback` as a target.
    ///
    /// If it becomes the primary target it is called before this returns.
    #[must_use = "dropping the Registration immediately deregisters the target"]
    pub fn register_target(&self, callback: impl Fn(Delivery<T>) + 'static) -> Registration {
        let callback: TargetFn<T> = Rc::new(callback);
        self.inner.targets.store(callback)
    }

    /// True if both handles refer to the same channel.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
