//! The [`CompareUpdate`] protocol driving the retry loops of
//! [`AtomicCell::compare_update_raw`] and [`AtomicCell::compare_update`].
//!
//! An updater supplies the first `(expected, new)` pair, then gets a chance to
//! rebuild the to-be-stored value (or give up) every time a compare-exchange
//! observes something other than what it expected.
//!
//! [`AtomicCell::compare_update_raw`]: crate::AtomicCell::compare_update_raw
//! [`AtomicCell::compare_update`]: crate::AtomicCell::compare_update

/// How to treat data across retries of a compare-exchange loop.
///
/// `Current` is the type of the comparand (a raw storage value or a `T`), and
/// `T` is the value being stored.
pub trait CompareUpdate<Current, T> {
    /// Returned by [`CompareUpdate::retry`] to abort the loop.
    type Error;

    /// State carried from one attempt to the next.
    type Retry;

    /// Returned once a store succeeds.
    type Final;

    /// The carried state, the assumed current value, and the value to store
    /// on the first attempt.
    fn initial(self) -> (Self::Retry, Current, T);

    /// Called after a failed attempt. `current` is the value the failed
    /// attempt observed and `val` is the value it failed to store.
    fn retry(retry: Self::Retry, current: Current, val: T)
        -> Result<(Self::Retry, T), Self::Error>;

    /// Combines the carried state with the value that was swapped out.
    fn finalize(retry: Self::Retry, val: T) -> Self::Final;
}

/// `(state, expected, new, retry)`: finalizes to the swapped-out value.
impl<U, T, F, C, E> CompareUpdate<U, T> for (C, U, T, F)
where
    F: FnMut(C, U, T) -> Result<(C, T), E>,
{
    type Error = E;
    type Retry = (C, F);
    type Final = T;

    fn initial(self) -> (Self::Retry, U, T) {
        let (state, expected, new, retry) = self;
        ((state, retry), expected, new)
    }

    fn retry(
        (state, mut retry): Self::Retry,
        current: U,
        val: T,
    ) -> Result<(Self::Retry, T), Self::Error> {
        let (state, next) = retry(state, current, val)?;
        Ok(((state, retry), next))
    }

    fn finalize(_: Self::Retry, swapped_out: T) -> Self::Final {
        swapped_out
    }
}

/// `(state, expected, new, retry, finalize)`: finalizes through the last closure.
impl<U, T, F, C, E, FF, R> CompareUpdate<U, T> for (C, U, T, F, FF)
where
    F: FnMut(C, U, T) -> Result<(C, T), E>,
    FF: FnOnce(C, T) -> R,
{
    type Error = E;
    type Retry = (C, F, FF);
    type Final = R;

    fn initial(self) -> (Self::Retry, U, T) {
        let (state, expected, new, retry, finalize) = self;
        ((state, retry, finalize), expected, new)
    }

    fn retry(
        (state, mut retry, finalize): Self::Retry,
        current: U,
        val: T,
    ) -> Result<(Self::Retry, T), Self::Error> {
        let (state, next) = retry(state, current, val)?;
        Ok(((state, retry, finalize), next))
    }

    fn finalize((state, _, finalize): Self::Retry, swapped_out: T) -> Self::Final {
        finalize(state, swapped_out)
    }
}
