//! Counting operations built from compare-and-set retry loops.
//!
//! Each operation reads the current value, computes its successor, and
//! commits it with a single compare-and-set, starting over from the freshly
//! observed value whenever another thread got there first. The committed
//! value is always derived from the value it replaced, so concurrent updates
//! are never lost.

use core::cmp::min;

use super::AtomicCell;
use crate::{atomic::AtomicStorage, numeric::Numeric, padding::Padding};

impl<T: Numeric, A: AtomicStorage, P: Padding> AtomicCell<T, A, P> {
    /// Commits `f(current)` and returns `(previous, next)`.
    #[inline]
    fn apply(&self, mut f: impl FnMut(T) -> T) -> (T, T) {
        let mut next = T::zero();
        let prev = match self.fetch_update::<_, true>(|current| {
            next = f(current);
            Some(next)
        }) {
            Ok(prev) | Err(prev) => prev,
        };
        (prev, next)
    }

    /// Adds one.
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU8, AtomicCell};
    ///
    /// let a = AtomicCell::<u8, AtomicU8>::new(254);
    /// a.increment();
    /// a.increment();
    /// assert_eq!(a.get(), 0);
    /// ```
    pub fn increment(&self) {
        self.add(T::one())
    }

    pub fn increment_and_get(&self) -> T {
        self.add_and_get(T::one())
    }

    pub fn get_and_increment(&self) -> T {
        self.get_and_add(T::one())
    }

    /// Adds `delta`, wrapping on overflow.
    pub fn add(&self, delta: T) {
        self.apply(|v| v.plus(delta));
    }

    /// Adds `delta` and returns the new value.
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicI64, AtomicCell};
    ///
    /// let a = AtomicCell::<i64, AtomicI64>::new(10);
    /// assert_eq!(a.add_and_get(5), 15);
    /// assert_eq!(a.get_and_add(5), 15);
    /// assert_eq!(a.get(), 20);
    /// ```
    pub fn add_and_get(&self, delta: T) -> T {
        self.apply(|v| v.plus(delta)).1
    }

    /// Adds `delta` and returns the value it replaced.
    pub fn get_and_add(&self, delta: T) -> T {
        self.apply(|v| v.plus(delta)).0
    }

    /// Subtracts `delta`, wrapping on underflow.
    pub fn subtract(&self, delta: T) {
        self.apply(|v| v.minus(delta));
    }

    pub fn subtract_and_get(&self, delta: T) -> T {
        self.apply(|v| v.minus(delta)).1
    }

    pub fn get_and_subtract(&self, delta: T) -> T {
        self.apply(|v| v.minus(delta)).0
    }

    /// Subtracts one.
    pub fn decrement(&self) {
        self.subtract(T::one())
    }

    pub fn decrement_and_get(&self) -> T {
        self.subtract_and_get(T::one())
    }

    pub fn get_and_decrement(&self) -> T {
        self.get_and_subtract(T::one())
    }

    /// Subtracts `min(step, current)`, so the value saturates at zero, and
    /// returns how much was actually subtracted.
    ///
    /// Returns zero without touching the cell once it has reached zero (or
    /// holds a negative value), and when `step` is not positive.
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let permits = AtomicCell::<u32, AtomicU32>::new(10);
    /// let taken: Vec<_> = (0..6).map(|_| permits.count_down_to_zero(3)).collect();
    /// assert_eq!(taken, [3, 3, 3, 1, 0, 0]);
    /// assert_eq!(permits.get(), 0);
    /// ```
    pub fn count_down_to_zero(&self, step: T) -> T {
        let zero = T::zero();
        if step <= zero {
            return zero;
        }
        let mut taken = zero;
        match self.fetch_update::<_, true>(|current| {
            if current <= zero {
                taken = zero;
                None
            } else {
                taken = min(step, current);
                Some(current.minus(taken))
            }
        }) {
            // `Err` means the cell was already drained and `taken` is zero
            Ok(_) | Err(_) => taken,
        }
    }
}
