#![forbid(unsafe_code)]

//! Test support: targets that record every delivery.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::channel::Channel;
use crate::delivery::Delivery;
use crate::primary::Registration;
use crate::registry::ChannelRegistry;

/// A target that appends each delivery to a log.
pub struct CaptureTarget<T> {
    captured: Rc<RefCell<Vec<Delivery<T>>>>,
    registration: Registration,
}

impl<T: fmt::Debug> fmt::Debug for CaptureTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureTarget")
            .field("captured", &self.captured.borrow())
            .field("registration", &self.registration)
            .finish()
    }
}

impl<T: Clone + 'static> CaptureTarget<T> {
    /// Register on `channel`.
    #[must_use]
    pub fn attach(channel: &Channel<T>) -> Self {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&captured);
        let registration = channel.register_target(move |d| sink.borrow_mut().push(d));
        Self {
            captured,
            registration,
        }
    }

    /// Register on the channel `name` of `registry`.
    #[must_use]
    pub fn on(registry: &ChannelRegistry<T>, name: &str) -> Self {
        Self::attach(&registry.get(name))
    }

    /// Every delivery so far, oldest first.
    #[must_use]
    pub fn captured(&self) -> Vec<Delivery<T>> {
        self.captured.borrow().clone()
    }

    /// Most recent delivery.
    #[must_use]
    pub fn latest(&self) -> Option<Delivery<T>> {
        self.captured.borrow().last().cloned()
    }

    /// Number of deliveries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captured.borrow().len()
    }

    /// True if nothing was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captured.borrow().is_empty()
    }

    /// Registration handle.
    #[must_use]
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Leave the channel. Idempotent.
    pub fn deregister(&self) {
        self.registration.deregister();
    }
}
