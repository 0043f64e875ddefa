#![forbid(unsafe_code)]

//! Widget-side bindings that hold portal registrations across renders.
//!
//! A widget declaring portal content keeps a [`SourceBinding`]; a widget
//! displaying it keeps a [`TargetBinding`]. Both deregister on drop, so
//! unmounting the widget is enough to leave the channel.
//!
//! Changing the name or content of a binding deregisters the previous entry
//! before registering the new one. A re-registered source therefore moves to
//! the back of its channel's source order.

use std::fmt;

use crate::channel::Channel;
use crate::content_cell::{ContentCell, Subscription};
use crate::delivery::Delivery;
use crate::error::PortalError;
use crate::primary::Registration;
use crate::registry::ChannelRegistry;

/// Registration of one piece of content under a channel name.
pub struct SourceBinding<T> {
    registry: ChannelRegistry<T>,
    name: String,
    content: T,
    registration: Registration,
}

impl<T: fmt::Debug> fmt::Debug for SourceBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBinding")
            .field("name", &self.name)
            .field("content", &self.content)
            .field("registration", &self.registration)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> SourceBinding<T> {
    /// Register `content` under `name`.
    pub fn new(registry: &ChannelRegistry<T>, name: impl Into<String>, content: T) -> Self {
        let name = name.into();
        let registration = registry.get(&name).register_source(content.clone());
        Self {
            registry: registry.clone(),
            name,
            content,
            registration,
        }
    }

    /// Like [`new`](Self::new), validating `name` against the registry config.
    pub fn try_new(
        registry: &ChannelRegistry<T>,
        name: impl Into<String>,
        content: T,
    ) -> Result<Self, PortalError> {
        let name = name.into();
        registry.config().validate_name(&name)?;
        Ok(Self::new(registry, name, content))
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered content.
    #[must_use]
    pub fn content(&self) -> &T {
        &self.content
    }

    /// Replace the content. Returns `false` (and does nothing) when it is
    /// equal to the current content.
    pub fn set_content(&mut self, content: T) -> bool {
        if content == self.content {
            return false;
        }
        self.content = content;
        self.reregister();
        true
    }

    /// Move the content to another channel. Returns `false` when the name is
    /// unchanged.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.name {
            return false;
        }
        self.name = name;
        self.reregister();
        true
    }

    fn reregister(&mut self) {
        self.registration.deregister();
        self.registration = self
            .registry
            .get(&self.name)
            .register_source(self.content.clone());
    }
}

/// Receiver for a channel's content, with the delivered value kept as
/// render state.
///
/// Before any delivery (and while another target is primary) the state is
/// [`Delivery::Vacant`].
pub struct TargetBinding<T> {
    registry: ChannelRegistry<T>,
    name: String,
    state: ContentCell<Delivery<T>>,
    fallback: Option<T>,
    registration: Registration,
}

impl<T: fmt::Debug> fmt::Debug for TargetBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetBinding")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("fallback", &self.fallback)
            .field("registration", &self.registration)
            .finish()
    }
}

impl<T: Clone + 'static> TargetBinding<T> {
    /// Register as a target of `name`. Delivers immediately if this becomes
    /// the primary target.
    pub fn new(registry: &ChannelRegistry<T>, name: impl Into<String>) -> Self {
        let name = name.into();
        let state = ContentCell::new(Delivery::Vacant);
        let registration = attach(&registry.get(&name), &state);
        Self {
            registry: registry.clone(),
            name,
            state,
            fallback: None,
            registration,
        }
    }

    /// Like [`new`](Self::new), validating `name` against the registry config.
    pub fn try_new(
        registry: &ChannelRegistry<T>,
        name: impl Into<String>,
    ) -> Result<Self, PortalError> {
        let name = name.into();
        registry.config().validate_name(&name)?;
        Ok(Self::new(registry, name))
    }

    /// Content shown by [`display`](Self::display) while the channel is
    /// vacant.
    #[must_use]
    pub fn with_fallback(mut self, fallback: T) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest delivery.
    #[must_use]
    pub fn current(&self) -> Delivery<T> {
        self.state.get()
    }

    /// Latest delivered content, `None` while vacant.
    #[must_use]
    pub fn content(&self) -> Option<T> {
        self.state.get().into_content()
    }

    /// Content to render: the delivered content, else the fallback.
    #[must_use]
    pub fn display(&self) -> Option<T> {
        match self.state.get() {
            Delivery::Content(value) => Some(value),
            Delivery::Vacant => self.fallback.clone(),
        }
    }

    /// Number of state writes. Compare across frames to detect changes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    /// Shared render state.
    #[must_use]
    pub fn state(&self) -> &ContentCell<Delivery<T>> {
        &self.state
    }

    /// Observe every delivery (e.g. to schedule a redraw).
    pub fn subscribe(&self, callback: impl Fn(&Delivery<T>) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    /// Retarget to another channel. Returns `false` when the name is
    /// unchanged.
    ///
    /// Content from the old channel is dropped: if this binding does not
    /// become the primary target of the new channel, its state is reset to
    /// [`Delivery::Vacant`].
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.name {
            return false;
        }
        self.registration.deregister();
        self.name = name;
        let channel = self.registry.get(&self.name);
        self.registration = attach(&channel, &self.state);
        let primary = channel.targets().primary_id() == Some(self.registration.id());
        if !primary && !self.current().is_vacant() {
            self.state.set(Delivery::Vacant);
        }
        true
    }
}

fn attach<T: Clone + 'static>(
    channel: &Channel<T>,
    state: &ContentCell<Delivery<T>>,
) -> Registration {
    let state = state.clone();
    channel.register_target(move |delivery| state.set(delivery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn target_starts_vacant_and_receives_content() {
        let registry = ChannelRegistry::new();
        let target = TargetBinding::new(&registry, "hook");
        assert!(target.current().is_vacant());
        let _source = SourceBinding::new(&registry, "hook", "content");
        assert_eq!(target.current(), Delivery::Content("content"));
        assert_eq!(target.content(), Some("content"));
    }

    #[test]
    fn content_change_redelivers() {
        let registry = ChannelRegistry::new();
        let target = TargetBinding::new(&registry, "hook");
        let mut source = SourceBinding::new(&registry, "hook", "one");
        let before = target.version();
        assert!(source.set_content("two"));
        assert_eq!(target.current(), Delivery::Content("two"));
        assert!(target.version() > before);
    }

    #[test]
    fn unchanged_content_is_not_reregistered() {
        let registry = ChannelRegistry::new();
        let target = TargetBinding::new(&registry, "hook");
        let mut source = SourceBinding::new(&registry, "hook", "one");
        let version = target.version();
        assert!(!source.set_content("one"));
        assert_eq!(target.version(), version);
        assert!(!source.set_name("hook"));
        assert_eq!(source.name(), "hook");
        assert_eq!(*source.content(), "one");
    }

    #[test]
    fn renamed_source_moves_to_new_target() {
        let registry = ChannelRegistry::new();
        let t1 = TargetBinding::new(&registry, "t1");
        let t2 = TargetBinding::new(&registry, "t2");
        let mut source = SourceBinding::new(&registry, "t1", "hello");
        assert_eq!(t1.current(), Delivery::Content("hello"));
        assert!(t2.current().is_vacant());

        assert!(source.set_name("t2"));
        assert!(t1.current().is_vacant());
        assert_eq!(t2.current(), Delivery::Content("hello"));
    }

    #[test]
    fn retargeted_primary_hands_over_to_next_target() {
        let registry = ChannelRegistry::new();
        let _source = SourceBinding::new(&registry, "t1", "hello");
        let mut first = TargetBinding::new(&registry, "t1");
        let second = TargetBinding::new(&registry, "t1");
        assert_eq!(first.current(), Delivery::Content("hello"));
        assert!(second.current().is_vacant());

        assert!(first.set_name("t2"));
        assert!(first.current().is_vacant());
        assert_eq!(second.current(), Delivery::Content("hello"));
        assert_eq!(first.name(), "t2");
    }

    #[test]
    fn retarget_behind_existing_primary_resets_state() {
        let registry = ChannelRegistry::new();
        let _a = SourceBinding::new(&registry, "a", "from-a");
        let _b = SourceBinding::new(&registry, "b", "from-b");
        let _owner = TargetBinding::new(&registry, "b");
        let mut mover = TargetBinding::new(&registry, "a");
        assert_eq!(mover.current(), Delivery::Content("from-a"));

        mover.set_name("b");
        assert!(mover.current().is_vacant());
    }

    #[test]
    fn display_uses_fallback_only_when_vacant() {
        let registry = ChannelRegistry::new();
        let target = TargetBinding::new(&registry, "slot").with_fallback("placeholder");
        assert_eq!(target.display(), Some("placeholder"));
        assert!(target.current().is_vacant());

        let source = SourceBinding::new(&registry, "slot", "real");
        assert_eq!(target.display(), Some("real"));
        drop(source);
        assert_eq!(target.display(), Some("placeholder"));
    }

    #[test]
    fn dropping_bindings_empties_registry() {
        let registry = ChannelRegistry::new();
        {
            let _target = TargetBinding::new(&registry, "x");
            let _source = SourceBinding::new(&registry, "x", 1u8);
            assert!(registry.contains("x"));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn subscribe_sees_deliveries() {
        let registry = ChannelRegistry::new();
        let target = TargetBinding::new(&registry, "x");
        let hits = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&hits);
        let _sub = target.subscribe(move |_| counter.set(counter.get() + 1));
        let _source = SourceBinding::new(&registry, "x", 'c');
        assert_eq!(hits.get(), 1);
        assert_eq!(target.state().get(), Delivery::Content('c'));
    }

    #[test]
    fn try_new_rejects_invalid_names() {
        let registry: ChannelRegistry<u8> = ChannelRegistry::with_config(PortalConfig::default());
        assert_eq!(
            SourceBinding::try_new(&registry, "", 1).unwrap_err(),
            PortalError::EmptyName
        );
        assert_eq!(
            TargetBinding::try_new(&registry, "").unwrap_err(),
            PortalError::EmptyName
        );
        assert!(registry.is_empty());
        assert!(TargetBinding::try_new(&registry, "ok").is_ok());
    }
}
