use core::{fmt, mem::needs_drop};

use crossbeam_utils::Backoff;

use super::{from_underlying, into_underlying, AtomicCell, TransmuteUnderlying};
use crate::{
    atomic::{compare_exchange, AtomicStorage, Ordering},
    compare_update::CompareUpdate,
    padding::{Padding, Slot},
};

impl<T, A: AtomicStorage, P: Padding> AtomicCell<T, A, P> {
    /// Creates a new atomic cell initialized with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, padding::PadBoth, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    /// let b = AtomicCell::<_, AtomicU32, PadBoth>::new(7u32);
    /// ```
    pub fn new(val: T) -> Self {
        let () = Self::ASSERT_SUPPORTED;
        let val = into_underlying::<T, A>(val);
        Self::from_storage(A::new(val))
    }

    /// Consumes the atomic and returns the contained value.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    /// assert_eq!(a.into_inner(), 7);
    /// ```
    pub fn into_inner(self) -> T {
        let val = self.into_storage().into_inner();

        // Passing `self` by value guarantees ownership over the storage, and
        // with it over the proper `T` it holds
        unsafe { from_underlying::<T, A>(val) }
    }

    /// Returns a mutable reference to contained data.
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the atomic data.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    /// use std::num::NonZeroU32;
    ///
    /// let mut a = AtomicCell::<_, AtomicU32>::new(NonZeroU32::new(7));
    /// *a.get_mut() = NonZeroU32::new(12);
    /// assert_eq!(a.get(), NonZeroU32::new(12));
    /// ```
    pub fn get_mut(&mut self) -> &mut T {
        let () = Self::ASSERT_REF_SUPPORTED;
        let atomic: &mut A = Slot::get_mut(&mut *self.slot);
        let v = TransmuteUnderlying::<T, A>::from_mut(AtomicStorage::get_mut(atomic));

        // `&mut self` guarantees exclusive access to a proper `T` value
        unsafe { v.get_mut_value() }
    }

    /// Stores `val` into the atomic cell.
    ///
    /// The store has release ordering: a thread that later reads `val` (or a
    /// value derived from it) also sees everything this thread did before.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    /// a.set(8);
    /// assert_eq!(a.get(), 8);
    /// ```
    pub fn set(&self, val: T) {
        self.store(val, Ordering::Release)
    }

    /// Stores `val` with relaxed ordering.
    ///
    /// Other threads observe `val` eventually, but reading it establishes no
    /// happens-before relation with the writer. Only use this when the value
    /// is a hint and nothing else is published through it.
    ///
    /// A `T` with drop glue still goes through an acquire/release swap so the
    /// value it replaces can be dropped soundly.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicBool, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicBool>::new(false);
    /// a.lazy_set(true);
    /// assert!(a.get());
    /// ```
    pub fn lazy_set(&self, val: T) {
        self.store(val, Ordering::Relaxed)
    }

    fn store(&self, val: T, order: Ordering) {
        if needs_drop::<T>() {
            drop(self.get_and_set(val));
        } else {
            let val = into_underlying::<T, A>(val);
            self.atomic().store(val, order);
        }
    }

    /// Load a raw value from the the atomic cell. These raw values are not
    /// guaranteed to be safe to transmute, but are byte-equivalent to a
    /// value that was proper at one point. By the time they are returned
    /// they may no longer be (e.g. a pointer whose memory was already freed).
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// struct NoCopy(u32);
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(NoCopy(7));
    /// assert_eq!(a.load_raw(), 7);
    /// ```
    pub fn load_raw(&self) -> A::Underlying {
        self.atomic().load(Ordering::Acquire)
    }

    /// Stores `val` into the atomic cell and returns the previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    /// assert_eq!(a.get_and_set(8), 7);
    /// assert_eq!(a.get(), 8);
    /// ```
    pub fn get_and_set(&self, val: T) -> T {
        let val = into_underlying::<T, A>(val);
        let val = self.atomic().swap(val, Ordering::AcqRel);

        // `val` was swapped out of the storage, so it is a proper `T` we now own
        unsafe { from_underlying::<T, A>(val) }
    }

    /// Get the raw representation of a value (useful as the expected value
    /// of [`Self::compare_update_raw`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    /// use std::num::NonZeroU32;
    ///
    /// assert_eq!(AtomicCell::<_, AtomicU32>::get_raw(7).1, 7);
    /// assert_eq!(AtomicCell::<Option<NonZeroU32>, AtomicU32>::get_raw(None).1, 0);
    /// ```
    pub fn get_raw(val: T) -> (T, A::Underlying) {
        let () = Self::ASSERT_SUPPORTED;
        let val = TransmuteUnderlying::<T, A>::from_value(val);
        let raw = val.underlying();

        // `val` is an owned, proper `T` value
        let val = unsafe { val.value() };
        (val, raw)
    }

    /// Stores `new` if the cell currently holds the raw value `current`.
    ///
    /// On success this returns the previous value, which is byte-equal to
    /// `current`. On failure it hands `new` back along with the raw value the
    /// cell held instead.
    ///
    /// If `WEAK` is set the exchange may fail spuriously even when the
    /// comparison succeeds.
    pub fn compare_exchange_raw<const WEAK: bool>(
        &self,
        current: A::Underlying,
        new: T,
    ) -> Result<T, (T, A::Underlying)> {
        let new = TransmuteUnderlying::<T, A>::from_value(new);

        match compare_exchange::<A, WEAK>(
            self.atomic(),
            current,
            new.underlying(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            // `val` was swapped out of the storage, so it is a proper `T` we now own
            Ok(val) => Ok(unsafe { from_underlying::<T, A>(val) }),
            // `new` is still an owned, proper `T` value
            Err(next_curr) => Err((unsafe { new.value() }, next_curr)),
        }
    }

    /// Tries to swap out the value in the cell for one provided by
    /// [`CompareUpdate`].
    ///
    /// The pair from `updater.initial()` is attempted first. Every failed
    /// attempt (the cell changed in the meantime, or a weak exchange failed
    /// spuriously) calls `CompareUpdate::retry` with the raw value just
    /// observed, which either aborts the loop with `Err(_)` right away or
    /// produces the value for the next attempt, made after a brief spin. Once an attempt
    /// succeeds, `CompareUpdate::finalize` produces the result.
    ///
    /// The loop never blocks and is unbounded: it ends on success or abort.
    ///
    /// The raw values handed to `retry` are only byte-equivalent to some
    /// proper `T` stored at one point. Unless `T` is `Copy` they must not be
    /// turned back into a `T`; comparing them is always fine.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    ///
    /// let v: Result<_, ()> = a.compare_update_raw::<_, true>((
    ///     (),      // No retry data
    ///     7,       // The expected current raw value
    ///     8,       // The initial value to try to swap in
    ///     |(), _raw, _val| Ok(((), 14)),
    /// ));
    /// assert_eq!(v, Ok(7));
    /// assert_eq!(a.get(), 8);
    ///
    /// let v = a.compare_update_raw::<_, true>((
    ///     "hello",
    ///     5,       // The cell holds 8, so the first attempt fails
    ///     42,
    ///     |c, raw, _val| match (c, raw) {
    ///         ("hello", 8) => Err("arbitrary error"),
    ///         (c, v) => panic!("unexpected value ({}, {})", c, v),
    ///     },
    /// ));
    /// assert_eq!(v, Err("arbitrary error"));
    /// assert_eq!(a.get(), 8);
    /// ```
    pub fn compare_update_raw<C, const WEAK: bool>(&self, updater: C) -> Result<C::Final, C::Error>
    where
        C: CompareUpdate<A::Underlying, T>,
    {
        let backoff = Backoff::new();
        let (mut retry, mut curr, mut val) = updater.initial();
        loop {
            match self.compare_exchange_raw::<WEAK>(curr, val) {
                Ok(prev) => return Ok(C::finalize(retry, prev)),
                Err((v, next_curr)) => {
                    let (c, v) = C::retry(retry, next_curr, v)?;
                    backoff.spin();
                    retry = c;
                    curr = next_curr;
                    val = v;
                }
            }
        }
    }
}

impl<T: Copy + fmt::Debug, A: AtomicStorage, P: Padding> fmt::Debug for AtomicCell<T, A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.get().fmt(f)
    }
}

impl<T: Default, A: AtomicStorage, P: Padding> Default for AtomicCell<T, A, P> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, A: AtomicStorage, P: Padding> From<T> for AtomicCell<T, A, P> {
    fn from(val: T) -> Self {
        Self::new(val)
    }
}

impl<T: Default, A: AtomicStorage, P: Padding> AtomicCell<T, A, P> {
    /// Takes the value of the atomic cell, leaving `Default::default()` in its
    /// place.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(5);
    /// assert_eq!(a.take(), 5);
    /// assert_eq!(a.into_inner(), 0);
    /// ```
    pub fn take(&self) -> T {
        self.get_and_set(Default::default())
    }
}

impl<T: Copy, A: AtomicStorage, P: Padding> AtomicCell<T, A, P> {
    /// Returns the current value.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    /// assert_eq!(a.get(), 7);
    /// ```
    pub fn get(&self) -> T {
        let val = self.load_raw();

        // `val` is a copy of a proper `T` value, and `T` is `Copy`
        unsafe { from_underlying::<T, A>(val) }
    }

    /// [`Self::compare_update_raw`], with the comparands as `T`s.
    pub fn compare_update<C, const WEAK: bool>(&self, updater: C) -> Result<C::Final, C::Error>
    where
        C: CompareUpdate<T, T>,
    {
        let (retry, curr, val) = updater.initial();
        self.compare_update_raw::<_, WEAK>((
            retry,
            into_underlying::<T, A>(curr),
            val,
            |retry: C::Retry, curr: A::Underlying, val: T| {
                // `curr` is a copy of a proper `T` value, and `T` is `Copy`
                let curr = unsafe { from_underlying::<T, A>(curr) };
                <C as CompareUpdate<T, T>>::retry(retry, curr, val)
            },
            <C as CompareUpdate<T, T>>::finalize,
        ))
    }

    /// Fetches the value, and applies a function to it that returns an optional
    /// new value. Returns `Ok(previous_value)` if the function returned
    /// `Some(_)`, else `Err(previous_value)`.
    ///
    /// The function may be called several times if the value is changed by
    /// other threads in the meantime, but only one of its results is stored.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(7);
    ///
    /// assert_eq!(a.fetch_update::<_, true>(|_| None), Err(7));
    /// assert_eq!(a.fetch_update::<_, true>(|a| Some(a + 1)), Ok(7));
    /// assert_eq!(a.fetch_update::<_, true>(|a| Some(a + 1)), Ok(8));
    /// assert_eq!(a.get(), 9);
    /// ```
    pub fn fetch_update<F: FnMut(T) -> Option<T>, const WEAK: bool>(&self, mut f: F) -> Result<T, T> {
        let curr = self.get();
        let val = match f(curr) {
            Some(val) => val,
            None => return Err(curr),
        };
        self.compare_update::<_, WEAK>(((), curr, val, |(), curr, _| match f(curr) {
            Some(val) => Ok(((), val)),
            None => Err(curr),
        }))
    }
}

impl<T: Copy + PartialEq, A: AtomicStorage, P: Padding> AtomicCell<T, A, P> {
    /// If the current value equals `current`, stores `new` into the atomic
    /// cell.
    ///
    /// Equality is `T`'s [`PartialEq`], not bitwise identity: when the cell
    /// holds different bytes that still compare equal, the exchange is
    /// retried against those bytes. The result indicates whether `new` was
    /// written and contains the previous value, which on success equals
    /// `current`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicU32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicU32>::new(1);
    ///
    /// assert_eq!(a.compare_exchange::<true>(2, 3), Err(1));
    /// assert_eq!(a.get(), 1);
    ///
    /// assert_eq!(a.compare_exchange::<true>(1, 2), Ok(1));
    /// assert_eq!(a.get(), 2);
    /// ```
    pub fn compare_exchange<const WEAK: bool>(&self, current: T, new: T) -> Result<T, T> {
        self.compare_update::<_, WEAK>(((), current, new, |(), prev, new| {
            if current == prev {
                Ok(((), new))
            } else {
                Err(prev)
            }
        }))
    }

    /// Replaces the value with `update` iff it currently equals `expect`,
    /// returning whether the swap happened. Never fails spuriously.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_cancelable::{atomic::AtomicI32, AtomicCell};
    ///
    /// let a = AtomicCell::<_, AtomicI32>::new(5);
    /// assert!(a.compare_and_set(5, 9));
    /// assert!(!a.compare_and_set(5, 1));
    /// assert_eq!(a.get(), 9);
    /// ```
    pub fn compare_and_set(&self, expect: T, update: T) -> bool {
        self.compare_exchange::<true>(expect, update).is_ok()
    }
}
