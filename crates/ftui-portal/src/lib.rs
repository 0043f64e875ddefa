#![forbid(unsafe_code)]

//! Portals: render content declared in one part of a widget tree somewhere
//! else in the tree.
//!
//! # Role in FrankenTUI
//! `ftui-portal` is the bookkeeping behind "teleported" widgets: a footer
//! that shows actions declared by the active screen, a header title set by a
//! nested view. Content stays owned by the widget that declared it; only the
//! place it is drawn moves.
//!
//! # Primary responsibilities
//! - **PrimaryTracker**: contending registrations, earliest one wins.
//! - **Channel**: pairs one source tracker with one target tracker and
//!   delivers the primary source to the primary target.
//! - **ChannelRegistry**: lazily created channels by name, removed once they
//!   have neither sources nor targets.
//! - **PortalScope / bindings**: registry visibility across a tree, and
//!   widget-side handles that keep registrations across renders.
//!
//! # Execution model
//! Everything is single-threaded and synchronous. Registration and
//! deregistration run their notifications before returning; callbacks may
//! register or deregister again.
//!
//! ```
//! use ftui_portal::{Delivery, PortalScope};
//!
//! let root = PortalScope::root();
//! let footer = root.target("actions");
//! assert_eq!(footer.current(), Delivery::Vacant);
//!
//! let screen = root.inherit().source("actions", "[q] quit");
//! assert_eq!(footer.current(), Delivery::Content("[q] quit"));
//!
//! drop(screen);
//! assert_eq!(footer.current(), Delivery::Vacant);
//! ```

pub mod binding;
pub mod channel;
pub mod config;
pub mod content_cell;
pub mod delivery;
pub mod entry;
pub mod error;
pub mod primary;
pub mod registry;
pub mod scope;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use binding::{SourceBinding, TargetBinding};
pub use channel::{Channel, TargetFn};
pub use config::PortalConfig;
pub use content_cell::{ContentCell, Subscription};
pub use delivery::Delivery;
pub use entry::EntryId;
pub use error::PortalError;
pub use primary::{PrimaryTracker, Registration};
pub use registry::ChannelRegistry;
pub use scope::PortalScope;
