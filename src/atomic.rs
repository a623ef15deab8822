//! The [`AtomicStorage`] trait and its implementations for the native atomics
pub use core::sync::atomic::{
    AtomicBool, AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicPtr, AtomicU16,
    AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering,
};

/// A native atomic which can back an [`AtomicCell`](crate::AtomicCell).
///
/// Every method forwards to the inherent method of the same name on the
/// native atomic, so the documentation of [`AtomicUsize`] applies.
pub trait AtomicStorage: Sized + Send + Sync {
    /// The plain value type with the same in-memory representation as `Self`.
    type Underlying: Copy + PartialEq;

    /// An all-zero underlying value. Used to give the unused bytes of a
    /// smaller payload a consistent value.
    const ZERO: Self::Underlying;

    fn new(v: Self::Underlying) -> Self;

    fn into_inner(self) -> Self::Underlying;

    fn get_mut(&mut self) -> &mut Self::Underlying;

    fn load(&self, order: Ordering) -> Self::Underlying;

    fn store(&self, val: Self::Underlying, order: Ordering);

    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    fn compare_exchange(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;

    /// Like [`AtomicStorage::compare_exchange`], but allowed to fail spuriously
    /// even when the comparison succeeds.
    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;
}

/// Dispatches to [`AtomicStorage::compare_exchange`] or
/// [`AtomicStorage::compare_exchange_weak`] depending on `WEAK`.
pub fn compare_exchange<A: AtomicStorage, const WEAK: bool>(
    a: &A,
    current: A::Underlying,
    new: A::Underlying,
    success: Ordering,
    failure: Ordering,
) -> Result<A::Underlying, A::Underlying> {
    if WEAK {
        a.compare_exchange_weak(current, new, success, failure)
    } else {
        a.compare_exchange(current, new, success, failure)
    }
}

macro_rules! impl_storage {
    (<$($g:ident)?> $t1:ty, $t2:ty, $z:expr) => {
impl $(<$g>)? AtomicStorage for $t1 {
    type Underlying = $t2;

    const ZERO: Self::Underlying = $z;

    #[inline]
    fn new(val: Self::Underlying) -> Self {
        <$t1>::new(val)
    }

    #[inline]
    fn into_inner(self) -> Self::Underlying {
        <$t1>::into_inner(self)
    }

    #[inline]
    fn get_mut(&mut self) -> &mut Self::Underlying {
        <$t1>::get_mut(self)
    }

    #[inline]
    fn load(&self, order: Ordering) -> Self::Underlying {
        <$t1>::load(self, order)
    }

    #[inline]
    fn store(&self, val: Self::Underlying, order: Ordering) {
        <$t1>::store(self, val, order)
    }

    #[inline]
    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
        <$t1>::swap(self, val, order)
    }

    #[inline]
    fn compare_exchange(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying> {
        <$t1>::compare_exchange(self, current, new, success, failure)
    }

    #[inline]
    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying> {
        <$t1>::compare_exchange_weak(self, current, new, success, failure)
    }
}
    };
    ($t1:ty, $t2:ty, $z:expr) => { impl_storage!{<> $t1, $t2, $z} };
    ($t1:ty, $t2:ty) => { impl_storage!{<> $t1, $t2, 0} };
}

impl_storage! {<T> AtomicPtr<T>, *mut T, core::ptr::null_mut::<T>()}
impl_storage! {AtomicUsize, usize}
impl_storage! {AtomicIsize, isize}
impl_storage! {AtomicU64, u64}
impl_storage! {AtomicI64, i64}
impl_storage! {AtomicU32, u32}
impl_storage! {AtomicI32, i32}
impl_storage! {AtomicU16, u16}
impl_storage! {AtomicI16, i16}
impl_storage! {AtomicU8, u8}
impl_storage! {AtomicI8, i8}
impl_storage! {AtomicBool, bool, false}
