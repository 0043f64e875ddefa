#![forbid(unsafe_code)]

//! Registry visibility across a widget tree.
//!
//! Portals only connect within one registry. A [`PortalScope`] is the value a
//! widget tree passes down to its descendants (the same way it passes a
//! theme or a focus manager): children call [`PortalScope::inherit`] to see
//! their parent's registry, and a subtree that must not observe outside
//! portals calls [`PortalScope::isolated`] to shadow it with a fresh one.
//!
//! ```text
//! root ─────────────── registry A
//!  ├─ inherit() ────── registry A   (portals connect with root)
//!  └─ isolated() ───── registry B   (own namespace)
//!      └─ inherit() ── registry B
//! ```

use crate::binding::{SourceBinding, TargetBinding};
use crate::config::PortalConfig;
use crate::registry::ChannelRegistry;

/// One level of portal visibility in a widget tree.
#[derive(Debug)]
pub struct PortalScope<T> {
    registry: ChannelRegistry<T>,
    depth: usize,
}

impl<T> Clone for PortalScope<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            depth: self.depth,
        }
    }
}

impl<T: Clone + 'static> Default for PortalScope<T> {
    fn default() -> Self {
        Self::root()
    }
}

impl<T: Clone + 'static> PortalScope<T> {
    /// Root scope with a fresh registry.
    #[must_use]
    pub fn root() -> Self {
        Self::root_with_config(PortalConfig::default())
    }

    /// Root scope with a fresh registry using `config`.
    #[must_use]
    pub fn root_with_config(config: PortalConfig) -> Self {
        Self {
            registry: ChannelRegistry::with_config(config),
            depth: 0,
        }
    }

    /// Child scope sharing this scope's registry.
    #[must_use]
    pub fn inherit(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            depth: self.depth + 1,
        }
    }

    /// Child scope with its own registry, shadowing this one for the
    /// subtree. The new registry copies this scope's config.
    #[must_use]
    pub fn isolated(&self) -> Self {
        self.isolated_with_config(self.registry.config().clone())
    }

    /// Child scope with its own registry using `config`.
    #[must_use]
    pub fn isolated_with_config(&self, config: PortalConfig) -> Self {
        Self {
            registry: ChannelRegistry::with_config(config),
            depth: self.depth + 1,
        }
    }

    /// Registry visible from this scope.
    #[must_use]
    pub fn registry(&self) -> &ChannelRegistry<T> {
        &self.registry
    }

    /// Nesting depth; the root is 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True if portals declared in `self` and `other` can connect.
    #[must_use]
    pub fn shares_registry(&self, other: &Self) -> bool {
        self.registry.ptr_eq(&other.registry)
    }

    /// Bind a target to `name` in this scope.
    pub fn target(&self, name: impl Into<String>) -> TargetBinding<T> {
        TargetBinding::new(&self.registry, name)
    }
}

impl<T: Clone + PartialEq + 'static> PortalScope<T> {
    /// Bind `content` as a source of `name` in this scope.
    pub fn source(&self, name: impl Into<String>, content: T) -> SourceBinding<T> {
        SourceBinding::new(&self.registry, name, content)
    }
}
