use alloc::{boxed::Box, sync::Arc};
use core::fmt;

use super::{BooleanCancelable, Cancelable, SharedCancelable};
use crate::{atomic::AtomicPtr, utils::trace, AtomicCell};

/// `Some(target)` while active, `None` once canceled.
type State = Option<Box<SharedCancelable>>;

/// A cancelable whose underlying target can be replaced at any time.
///
/// Canceling it cancels whichever target is installed at that moment. Once
/// canceled, every target assigned afterwards is canceled immediately
/// instead of being installed, so no target can escape cancelation.
/// Replacing a target does *not* cancel the previous one.
///
/// Assignment and cancelation race on a single atomic cell; whichever
/// commits first decides the outcome for the other.
///
/// ```
/// use atomic_cancelable::cancelable::{BooleanCancelable, Cancelable, MultiAssignmentCancelable};
/// use std::sync::Arc;
///
/// let first = Arc::new(BooleanCancelable::new());
/// let second = Arc::new(BooleanCancelable::new());
///
/// let token = MultiAssignmentCancelable::new();
/// token.assign(first.clone()).assign(second.clone());
///
/// assert!(token.cancel());
/// assert!(!first.is_canceled());
/// assert!(second.is_canceled());
///
/// let late = Arc::new(BooleanCancelable::new());
/// token.assign(late.clone());
/// assert!(late.is_canceled());
/// ```
pub struct MultiAssignmentCancelable {
    state: AtomicCell<State, AtomicPtr<SharedCancelable>>,
}

impl MultiAssignmentCancelable {
    /// An active token holding an inert placeholder target.
    pub fn new() -> Self {
        Self::with_target(Arc::new(BooleanCancelable::dummy()))
    }

    /// An active token holding `target`.
    pub fn with_target(target: SharedCancelable) -> Self {
        Self {
            state: AtomicCell::new(Some(Box::new(target))),
        }
    }

    /// Installs `target`, or cancels it right away if this token is already
    /// canceled.
    ///
    /// The target it replaces is released without being canceled.
    pub fn assign(&self, target: SharedCancelable) -> &Self {
        let current = self.state.load_raw();
        if current.is_null() {
            Self::reject(&target);
            return self;
        }

        // The raw comparands are only compared, never dereferenced, so a
        // target freed and reallocated at the same address is harmless: a
        // successful exchange always takes ownership of what it swapped out.
        let result = self.state.compare_update_raw::<_, true>((
            (),
            current,
            Some(Box::new(target)),
            |(), current: *mut SharedCancelable, target: State| {
                if current.is_null() {
                    Err(target)
                } else {
                    Ok(((), target))
                }
            },
        ));
        match result {
            Ok(replaced) => drop(replaced),
            Err(Some(rejected)) => Self::reject(&rejected),
            Err(None) => {}
        }
        self
    }

    fn reject(target: &SharedCancelable) {
        trace!("assignment to a canceled multi-assignment cancelable");
        target.cancel();
    }
}

impl Default for MultiAssignmentCancelable {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancelable for MultiAssignmentCancelable {
    #[inline]
    fn is_canceled(&self) -> bool {
        self.state.load_raw().is_null()
    }

    /// Moves to the canceled state and cancels the installed target. Only the
    /// call that performs the transition returns `true`.
    fn cancel(&self) -> bool {
        if self.is_canceled() {
            return false;
        }
        match self.state.get_and_set(None) {
            Some(target) => {
                trace!("multi-assignment cancelable canceled");
                target.cancel();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for MultiAssignmentCancelable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiAssignmentCancelable")
            .field("canceled", &self.is_canceled())
            .finish_non_exhaustive()
    }
}
