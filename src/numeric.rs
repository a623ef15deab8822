//! The arithmetic capability required by the counting operations of
//! [`AtomicCell`](crate::AtomicCell).

use num_traits::{One, WrappingAdd, WrappingSub, Zero};

/// A value with `zero`, `one`, addition, subtraction and a total order.
///
/// Addition and subtraction wrap on overflow. This holds for every
/// instantiation: an `AtomicCell<u8, _>` at `255` incremented once reads `0`,
/// and an `AtomicCell<i32, _>` at `i32::MIN` decremented once reads `i32::MAX`.
///
/// Blanket-implemented for every type providing the underlying
/// [`num_traits`] operations, which covers all primitive integers.
pub trait Numeric: Copy + Ord + Zero + One + WrappingAdd + WrappingSub {
    #[inline]
    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(&rhs)
    }

    #[inline]
    fn minus(self, rhs: Self) -> Self {
        self.wrapping_sub(&rhs)
    }
}

impl<N> Numeric for N where N: Copy + Ord + Zero + One + WrappingAdd + WrappingSub {}
