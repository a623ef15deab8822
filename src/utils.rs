/// Emits a `tracing` event at TRACE level when the `tracing` feature is
/// enabled, and compiles to nothing otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($t:tt)*) => { tracing::trace!($($t)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($t:tt)*) => {};
}

pub(crate) use trace;
