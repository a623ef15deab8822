use alloc::boxed::Box;
use core::fmt;

use super::Cancelable;
use crate::{
    atomic::{AtomicBool, AtomicPtr},
    utils::trace,
    AtomicCell,
};

type Callback = Box<dyn FnOnce() + Send>;

/// A cancelation flag which only ever reports `false` from
/// [`cancel`](Cancelable::cancel).
///
/// It is a hint: the store setting the flag is relaxed, so a thread seeing it
/// set learns nothing else about the canceling thread. Since the flag only
/// ever goes from live to canceled, a plain store is enough and no
/// compare-and-set is involved.
///
/// ```
/// use atomic_cancelable::cancelable::{Cancelable, WeakBooleanCancelable};
///
/// let c = WeakBooleanCancelable::new();
/// assert!(!c.cancel());
/// assert!(c.is_canceled());
/// assert!(!c.cancel());
/// ```
#[derive(Debug, Default)]
pub struct WeakBooleanCancelable {
    canceled: AtomicCell<bool, AtomicBool>,
}

impl WeakBooleanCancelable {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cancelable for WeakBooleanCancelable {
    #[inline]
    fn is_canceled(&self) -> bool {
        self.canceled.get()
    }

    #[inline]
    fn cancel(&self) -> bool {
        self.canceled.lazy_set(true);
        false
    }
}

/// A linearizable cancelation flag, optionally running a callback when it
/// is first canceled.
///
/// Exactly one call to [`cancel`](Cancelable::cancel) returns `true`, and
/// that call runs the callback before returning.
///
/// ```
/// use atomic_cancelable::cancelable::{BooleanCancelable, Cancelable};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let runs = Arc::new(AtomicUsize::new(0));
/// let c = BooleanCancelable::with_callback({
///     let runs = runs.clone();
///     move || {
///         runs.fetch_add(1, Ordering::SeqCst);
///     }
/// });
///
/// assert!(c.cancel());
/// assert!(!c.cancel());
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// ```
pub struct BooleanCancelable {
    canceled: AtomicCell<bool, AtomicBool>,
    callback: AtomicCell<Option<Box<Callback>>, AtomicPtr<Callback>>,
    /// Ignores cancelation entirely
    inert: bool,
}

impl BooleanCancelable {
    pub fn new() -> Self {
        Self::build(false, None, false)
    }

    /// A cancelable which runs `callback` on the first successful cancel.
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let callback: Callback = Box::new(callback);
        Self::build(false, Some(Box::new(callback)), false)
    }

    /// A cancelable which can never be canceled: `is_canceled` stays `false`
    /// and `cancel` does nothing. Used as a placeholder target.
    pub fn dummy() -> Self {
        Self::build(false, None, true)
    }

    /// A cancelable which is canceled from the start.
    pub fn already_canceled() -> Self {
        Self::build(true, None, false)
    }

    fn build(canceled: bool, callback: Option<Box<Callback>>, inert: bool) -> Self {
        Self {
            canceled: AtomicCell::new(canceled),
            callback: AtomicCell::new(callback),
            inert,
        }
    }
}

impl Default for BooleanCancelable {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancelable for BooleanCancelable {
    #[inline]
    fn is_canceled(&self) -> bool {
        self.canceled.get()
    }

    fn cancel(&self) -> bool {
        if self.inert || self.canceled.get_and_set(true) {
            return false;
        }
        trace!("boolean cancelable canceled");
        if let Some(callback) = self.callback.take() {
            let callback: Callback = *callback;
            callback();
        }
        true
    }
}

impl fmt::Debug for BooleanCancelable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanCancelable")
            .field("canceled", &self.canceled)
            .field("inert", &self.inert)
            .finish_non_exhaustive()
    }
}
