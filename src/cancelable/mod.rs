//! One-shot cancelation tokens.
//!
//! A [`Cancelable`] starts live and transitions to canceled at most once.
//! Every implementation here is lock-free: transitions are single atomic
//! stores or read-modify-writes on an [`AtomicCell`](crate::AtomicCell).
//!
//! - [`WeakBooleanCancelable`]: a bare flag with relaxed visibility.
//! - [`BooleanCancelable`]: a linearizable flag, optionally running a
//!   callback on the first cancelation.
//! - [`MultiAssignmentCancelable`]: forwards cancelation to a swappable
//!   target, and cancels any target assigned after the fact.

use alloc::sync::Arc;

mod boolean;
mod multi_assignment;

pub use boolean::{BooleanCancelable, WeakBooleanCancelable};
pub use multi_assignment::MultiAssignmentCancelable;

/// Something that can be canceled once.
pub trait Cancelable: Send + Sync {
    /// Whether [`Cancelable::cancel`] has taken effect.
    fn is_canceled(&self) -> bool;

    /// Requests cancelation.
    ///
    /// Returns `true` only when this call performed the transition and any
    /// action attached to it ran. Repeated calls return `false`, and some
    /// implementations (e.g. [`WeakBooleanCancelable`]) always do.
    fn cancel(&self) -> bool;
}

/// A cancelable shared between owners.
pub type SharedCancelable = Arc<dyn Cancelable>;

impl<C: Cancelable + ?Sized> Cancelable for Arc<C> {
    #[inline]
    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }

    #[inline]
    fn cancel(&self) -> bool {
        (**self).cancel()
    }
}
