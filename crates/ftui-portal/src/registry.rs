#![forbid(unsafe_code)]

//! Name → channel map with lazy creation and self-removal.
//!
//! A [`ChannelRegistry<T>`] hands out the same [`Channel`] for a name until
//! that channel empties (no sources, no targets), at which point the channel's
//! destructor removes it. The next `get` for the name creates a fresh channel.
//!
//! # Invariants
//!
//! 1. Two `get(name)` calls between removals return the same channel
//!    (`Channel::ptr_eq`).
//! 2. A channel with live registrations is never removed.
//! 3. A channel's destructor only removes the entry if the name still maps to
//!    that channel; emptying a stale handle never evicts a newer channel.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::channel::{Channel, next_channel_id};
use crate::config::PortalConfig;
use crate::error::PortalError;

struct RegistryInner<T> {
    channels: RefCell<HashMap<Rc<str>, Channel<T>>>,
    config: PortalConfig,
}

/// Registry of portal channels for one scope.
///
/// Cloning a `ChannelRegistry` creates a new handle to the **same** registry.
pub struct ChannelRegistry<T> {
    inner: Rc<RegistryInner<T>>,
}

impl<T> Clone for ChannelRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ChannelRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.inner.channels.borrow().len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl<T: Clone + 'static> Default for ChannelRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> ChannelRegistry<T> {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PortalConfig::default())
    }

    /// Create an empty registry with `config`.
    #[must_use]
    pub fn with_config(config: PortalConfig) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                channels: RefCell::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Registry configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Channel for `name`, created if absent.
    pub fn get(&self, name: &str) -> Channel<T> {
        if let Some(channel) = self.inner.channels.borrow().get(name) {
            return channel.clone();
        }

        let key: Rc<str> = Rc::from(name);
        let id = next_channel_id();
        let destructor = {
            let registry = Rc::downgrade(&self.inner);
            let key = Rc::clone(&key);
            move || {
                let Some(registry) = registry.upgrade() else {
                    return;
                };
                let removed = {
                    let mut channels = registry.channels.borrow_mut();
                    let current = channels.get(&key).is_some_and(|ch| ch.id() == id);
                    if current { channels.remove(&key) } else { None }
                };
                if removed.is_some() {
                    debug!(channel = %key, channel_id = id, "portal channel removed");
                }
            }
        };
        let channel = Channel::with_id(id, Rc::clone(&key), &self.inner.config, destructor);
        self.inner
            .channels
            .borrow_mut()
            .insert(key, channel.clone());
        channel
    }

    /// Like [`get`](Self::get), but validates `name` against the config first.
    pub fn try_get(&self, name: &str) -> Result<Channel<T>, PortalError> {
        self.inner.config.validate_name(name)?;
        Ok(self.get(name))
    }

    /// True if a live channel exists for `name`. Does not create one.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.channels.borrow().contains_key(name)
    }

    /// Number of live channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.channels.borrow().len()
    }

    /// True if no channels are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.channels.borrow().is_empty()
    }

    /// Names of live channels, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .channels
            .borrow()
            .keys()
            .map(|name| name.to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// True if both handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
