#![forbid(unsafe_code)]

//! Registry configuration.

use crate::error::PortalError;

/// Configuration shared by every channel of a [`ChannelRegistry`].
///
/// Only the checked APIs consult the name policy; `ChannelRegistry::get`
/// accepts any name.
///
/// [`ChannelRegistry`]: crate::ChannelRegistry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PortalConfig {
    /// Maximum channel name length in bytes.
    pub max_name_len: usize,
    /// Accept `""` as a channel name.
    pub allow_empty_names: bool,
    /// Emit a `trace!` event for every delivery to a target.
    pub trace_deliveries: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            max_name_len: 256,
            allow_empty_names: false,
            trace_deliveries: false,
        }
    }
}

impl PortalConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permissive configuration: any name, no length limit.
    #[must_use]
    pub fn unchecked() -> Self {
        Self {
            max_name_len: usize::MAX,
            allow_empty_names: true,
            trace_deliveries: false,
        }
    }

    /// Set the maximum name length.
    #[must_use]
    pub fn with_max_name_len(mut self, max: usize) -> Self {
        self.max_name_len = max;
        self
    }

    /// Set whether empty names are accepted.
    #[must_use]
    pub fn with_allow_empty_names(mut self, allow: bool) -> Self {
        self.allow_empty_names = allow;
        self
    }

    /// Set per-delivery tracing.
    #[must_use]
    pub fn with_trace_deliveries(mut self, enabled: bool) -> Self {
        self.trace_deliveries = enabled;
        self
    }

    /// Check `name` against the policy.
    pub fn validate_name(&self, name: &str) -> Result<(), PortalError> {
        if name.is_empty() && !self.allow_empty_names {
            return Err(PortalError::EmptyName);
        }
        if name.len() > self.max_name_len {
            return Err(PortalError::NameTooLong {
                len: name.len(),
                max: self.max_name_len,
            });
        }
        Ok(())
    }
}
