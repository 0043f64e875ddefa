#![forbid(unsafe_code)]

//! Values handed to portal targets.

/// What a target receives from its channel.
///
/// `Vacant` means the channel has no active source. It is distinct from every
/// content value, including "empty" content such as `String::new()` or a
/// `None` nested inside `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery<T> {
    /// Content from the channel's primary source.
    Content(T),
    /// No source is registered.
    Vacant,
}

impl<T> Default for Delivery<T> {
    fn default() -> Self {
        Self::Vacant
    }
}

impl<T> Delivery<T> {
    /// True if this is [`Delivery::Vacant`].
    #[inline]
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        matches!(self, Self::Vacant)
    }

    /// Borrow the delivered content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> Option<&T> {
        match self {
            Self::Content(value) => Some(value),
            Self::Vacant => None,
        }
    }

    /// Take the delivered content.
    #[inline]
    #[must_use]
    pub fn into_content(self) -> Option<T> {
        match self {
            Self::Content(value) => Some(value),
            Self::Vacant => None,
        }
    }

    /// Convert `&Delivery<T>` to `Delivery<&T>`.
    #[inline]
    pub fn as_ref(&self) -> Delivery<&T> {
        match self {
            Self::Content(value) => Delivery::Content(value),
            Self::Vacant => Delivery::Vacant,
        }
    }

    /// Map delivered content, keeping `Vacant` as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Delivery<U> {
        match self {
            Self::Content(value) => Delivery::Content(f(value)),
            Self::Vacant => Delivery::Vacant,
        }
    }

    /// Content for display: the delivered value, or `fallback` when vacant.
    ///
    /// The fallback is never fed back into the channel.
    #[inline]
    pub fn or_fallback(self, fallback: T) -> T {
        match self {
            Self::Content(value) => value,
            Self::Vacant => fallback,
        }
    }
}

impl<T> From<Option<T>> for Delivery<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Content(value),
            None => Self::Vacant,
        }
    }
}

impl<T> From<Delivery<T>> for Option<T> {
    fn from(value: Delivery<T>) -> Self {
        value.into_content()
    }
}
