#![forbid(unsafe_code)]

//! Errors from checked portal operations.

/// Errors from name validation.
///
/// The core registration path never fails; these only come out of the
/// checked constructors (`try_get`, `try_new`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// The channel name was empty and the config disallows that.
    EmptyName,
    /// The channel name exceeds `PortalConfig::max_name_len` bytes.
    NameTooLong { len: usize, max: usize },
}

impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "portal name is empty"),
            Self::NameTooLong { len, max } => {
                write!(f, "portal name is {len} bytes, limit is {max}")
            }
        }
    }
}

impl std::error::Error for PortalError {}
