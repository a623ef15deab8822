use core::{
    marker::PhantomData,
    mem::{align_of, size_of, ManuallyDrop},
};

use const_panic::concat_assert;

use crate::{
    atomic::AtomicStorage,
    padding::{NoPadding, Padding, PaddingLayout, Slot},
};

mod arith;
mod generic;

pub(crate) union TransmuteUnderlying<T, A: AtomicStorage> {
    value: ManuallyDrop<T>,
    underlying: A::Underlying,
}

impl<T, A: AtomicStorage> TransmuteUnderlying<T, A> {
    const SIZE: usize = size_of::<Self>();
    const UNDERLYING_SIZE: usize = size_of::<A::Underlying>();
    const SIZE_MATCHES: bool = Self::SIZE == Self::UNDERLYING_SIZE;

    const ALIGN: usize = align_of::<Self>();
    const UNDERLYING_ALIGN: usize = align_of::<A::Underlying>();
    /// This is true if all references to `A::Underlying` are safely
    /// transmutable to a `TransmuteUnderlying<T, A>`.
    const ALIGN_MATCHES: bool = Self::UNDERLYING_ALIGN % Self::ALIGN == 0;

    const fn assert_size_matches() {
        concat_assert!(
            <TransmuteUnderlying<T, A>>::SIZE_MATCHES,
            "payload (size=",
            <TransmuteUnderlying<T, A>>::SIZE,
            ") does not fit its atomic storage (size=",
            <TransmuteUnderlying<T, A>>::UNDERLYING_SIZE,
            ")",
        );
    }

    const fn assert_align_matches() {
        Self::assert_size_matches();
        concat_assert!(
            <TransmuteUnderlying<T, A>>::ALIGN_MATCHES,
            "payload (align=",
            <TransmuteUnderlying<T, A>>::ALIGN,
            ") is not aligned like its atomic storage (align=",
            <TransmuteUnderlying<T, A>>::UNDERLYING_ALIGN,
            ")",
        );
    }

    fn from_value(val: T) -> Self {
        // "zero" out the memory, so that when smaller `T`s are stored in
        // larger `A`s the unused bits have a consistent value
        let mut v = TransmuteUnderlying {
            underlying: A::ZERO,
        };
        v.value = ManuallyDrop::new(val);
        v
    }

    fn from_underlying(val: A::Underlying) -> Self {
        TransmuteUnderlying { underlying: val }
    }

    /// Only safe to call when `self` was constructed from a proper `T` value.
    unsafe fn value(self) -> T {
        ManuallyDrop::into_inner(self.value)
    }

    fn underlying(&self) -> A::Underlying {
        // `A::Underlying` is `Copy`, so this just reads back some POD
        unsafe { self.underlying }
    }

    fn from_mut(v: &mut A::Underlying) -> &mut Self {
        // Size and alignment of `Self` and `A::Underlying` match
        unsafe { &mut *(v as *mut A::Underlying as *mut Self) }
    }

    /// Only safe to call when `self` was constructed from a proper `T` value.
    unsafe fn get_mut_value(&mut self) -> &mut T {
        &mut self.value
    }
}

#[inline]
pub(crate) fn into_underlying<T, A: AtomicStorage>(val: T) -> A::Underlying {
    TransmuteUnderlying::<T, A>::from_value(val).underlying()
}

/// Only safe to call when `val` was produced from a proper `T` value which
/// the caller now owns (or which is `Copy`).
#[inline]
pub(crate) unsafe fn from_underlying<T, A: AtomicStorage>(val: A::Underlying) -> T {
    TransmuteUnderlying::<T, A>::from_underlying(val).value()
}

/// A thread-safe mutable memory location.
///
/// This type is equivalent to [`Cell`], except it can also be shared among
/// multiple threads. A `T` is stored in the native atomic `A` whose plain
/// value has the same size (e.g. a `#[repr(u8)]` enum in an `AtomicU8`, or an
/// `Option<Box<U>>` in an `AtomicPtr<U>`), and `P` selects the
/// [cache-line padding](crate::padding) around it.
///
/// Reads use [`Acquire`] ordering, writes use [`Release`] and
/// read-modify-writes use [`AcqRel`], so a value observed through
/// [`get`](Self::get) or a compare-and-set carries with it everything the
/// writing thread did before storing it. [`lazy_set`](Self::lazy_set) is the
/// only exception.
///
/// [`Cell`]: core::cell::Cell
/// [`Acquire`]: core::sync::atomic::Ordering::Acquire
/// [`Release`]: core::sync::atomic::Ordering::Release
/// [`AcqRel`]: core::sync::atomic::Ordering::AcqRel
///
/// # Drop
///
/// The stored `T` is dropped exactly once: when it is swapped out (and the
/// caller drops it), or when the cell itself is dropped.
///
/// # Compile errors
///
/// Constructors refuse to compile when `T` and `A::Underlying` differ in
/// size, and [`get_mut`](Self::get_mut) additionally when `T` is more strictly
/// aligned than `A::Underlying`. See [`AtomicCell::SUPPORTED`] and
/// [`AtomicCell::REF_SUPPORTED`].
pub struct AtomicCell<T, A: AtomicStorage, P: Padding = NoPadding> {
    /// Always holds a proper `T` value
    slot: ManuallyDrop<P::Storage<A>>,
    _marker: PhantomData<T>,
}

impl<T, A: AtomicStorage, P: Padding> AtomicCell<T, A, P> {
    /// `true` if the storage can hold a `T`.
    ///
    /// Building a cell whose payload does not fit is a compile error:
    ///
    /// ```compile_fail
    /// use atomic_cancelable::{atomic::AtomicU8, AtomicCell};
    ///
    /// let cell = AtomicCell::<u16, AtomicU8>::new(1);
    /// ```
    pub const SUPPORTED: bool = <TransmuteUnderlying<T, A>>::SIZE_MATCHES;

    /// Fails compilation when referenced if `!SUPPORTED`.
    pub const ASSERT_SUPPORTED: () = <TransmuteUnderlying<T, A>>::assert_size_matches();

    /// `true` if a `&mut A::Underlying` can be reinterpreted as a `&mut T`,
    /// i.e. the storage is at least as strictly aligned as `T`.
    pub const REF_SUPPORTED: bool =
        Self::SUPPORTED && <TransmuteUnderlying<T, A>>::ALIGN_MATCHES;

    /// Fails compilation when referenced if `!REF_SUPPORTED`.
    ///
    /// ```compile_fail
    /// use atomic_cancelable::{atomic::AtomicU8, AtomicCell};
    ///
    /// let () = AtomicCell::<u16, AtomicU8>::ASSERT_REF_SUPPORTED;
    /// ```
    pub const ASSERT_REF_SUPPORTED: () = <TransmuteUnderlying<T, A>>::assert_align_matches();

    /// The padding this cell was built with.
    pub const LAYOUT: PaddingLayout = P::LAYOUT;

    #[inline]
    fn from_storage(atomic: A) -> Self {
        Self {
            slot: ManuallyDrop::new(<P::Storage<A> as Slot<A>>::new(atomic)),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn into_storage(self) -> A {
        let mut this = ManuallyDrop::new(self);
        // `this` is never dropped, so the slot is moved out exactly once
        let slot = unsafe { ManuallyDrop::take(&mut this.slot) };
        slot.into_inner()
    }

    #[inline]
    fn atomic(&self) -> &A {
        self.slot.get()
    }

    /// The padding this cell was built with.
    #[inline]
    pub fn padding(&self) -> PaddingLayout {
        P::LAYOUT
    }
}

impl<T, A: AtomicStorage, P: Padding> Drop for AtomicCell<T, A, P> {
    fn drop(&mut self) {
        // The slot is not touched again after this
        let atomic = unsafe { ManuallyDrop::take(&mut self.slot) }.into_inner();
        // The cell owned the proper `T` held in `atomic`
        drop(unsafe { from_underlying::<T, A>(atomic.into_inner()) })
    }
}

unsafe impl<T: Send, A: AtomicStorage, P: Padding> Send for AtomicCell<T, A, P> {}
unsafe impl<T: Send, A: AtomicStorage, P: Padding> Sync for AtomicCell<T, A, P> {}
