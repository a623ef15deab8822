//! Cache-line padding for [`AtomicCell`](crate::AtomicCell)s.
//!
//! Two cells written by different threads but sharing a cache line keep
//! stealing that line from each other even though they never touch the same
//! data (false sharing). Padding trades memory for isolation: the hot atomic
//! is surrounded by bytes nothing else can occupy.
//!
//! The layout is picked with the third type parameter of `AtomicCell`:
//!
//! | marker        | layout                        | footprint of an 8-byte cell |
//! |---------------|-------------------------------|-----------------------------|
//! | [`NoPadding`] | `[value]`                     | 8                           |
//! | [`PadLeft`]   | `[pad][value]`                | 64                          |
//! | [`PadRight`]  | `[value][pad]`                | 64                          |
//! | [`PadBoth`]   | `[pad][value][pad]`           | 120                         |
//!
//! One pad unit is [`PAD_UNIT`] bytes, i.e. a cache line minus the widest
//! native atomic. The actual padding is therefore always smaller than the
//! nominal 64 (or 128) bytes: the payload's own size is subtracted, and
//! nothing aligns the cell itself to a line boundary. The isolation guarantee
//! is only that `PAD_UNIT` otherwise-unused bytes separate the atomic from
//! the start and/or the end of the cell.
//!
//! ```
//! use atomic_cancelable::{atomic::AtomicU64, padding::*, AtomicCell};
//! use std::mem::size_of;
//!
//! assert_eq!(size_of::<AtomicCell<u64, AtomicU64>>(), 8);
//! assert_eq!(size_of::<AtomicCell<u64, AtomicU64, PadLeft>>(), CACHE_LINE_SIZE);
//! assert_eq!(size_of::<AtomicCell<u64, AtomicU64, PadBoth>>(), 2 * PAD_UNIT + 8);
//! ```

use core::mem::size_of;

/// Size in bytes of the cache line padding is computed against.
pub const CACHE_LINE_SIZE: usize = 64;

/// Size in bytes of a single pad.
pub const PAD_UNIT: usize = CACHE_LINE_SIZE - size_of::<u64>();

/// Where padding is placed around a cell's atomic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaddingLayout {
    /// No extra memory.
    #[default]
    None,
    /// Isolate from whatever sits at lower addresses.
    Left,
    /// Isolate from whatever sits at higher addresses.
    Right,
    /// Isolate in both directions.
    Both,
}

impl PaddingLayout {
    pub const fn pads_before(self) -> bool {
        matches!(self, PaddingLayout::Left | PaddingLayout::Both)
    }

    pub const fn pads_after(self) -> bool {
        matches!(self, PaddingLayout::Right | PaddingLayout::Both)
    }

    /// Unused bytes reserved by this layout.
    pub const fn padding_bytes(self) -> usize {
        (self.pads_before() as usize + self.pads_after() as usize) * PAD_UNIT
    }

    /// The footprint the layout aims for: zero, one or two cache lines.
    pub const fn nominal_footprint(self) -> usize {
        (self.pads_before() as usize + self.pads_after() as usize) * CACHE_LINE_SIZE
    }
}

/// Storage for a value `A`, possibly surrounded by padding.
pub trait Slot<A> {
    fn new(value: A) -> Self;

    fn get(&self) -> &A;

    fn get_mut(&mut self) -> &mut A;

    fn into_inner(self) -> A;
}

/// Type-level selection of a [`PaddingLayout`].
pub trait Padding: 'static {
    const LAYOUT: PaddingLayout;

    /// How an `A` is laid out under this padding.
    type Storage<A>: Slot<A>;
}

macro_rules! padding {
    ($(#[$attr:meta])* $marker:ident => $layout:ident, $slot:ident { $($before:ident)? ; $($after:ident)? }) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub enum $marker {}

        impl Padding for $marker {
            const LAYOUT: PaddingLayout = PaddingLayout::$layout;
            type Storage<A> = $slot<A>;
        }

        #[doc = concat!("The [`Slot`] of [`", stringify!($marker), "`].")]
        #[repr(C)]
        pub struct $slot<A> {
            $($before: [u8; PAD_UNIT],)?
            value: A,
            $($after: [u8; PAD_UNIT],)?
        }

        impl<A> Slot<A> for $slot<A> {
            #[inline]
            fn new(value: A) -> Self {
                Self {
                    $($before: [0; PAD_UNIT],)?
                    value,
                    $($after: [0; PAD_UNIT],)?
                }
            }

            #[inline]
            fn get(&self) -> &A {
                &self.value
            }

            #[inline]
            fn get_mut(&mut self) -> &mut A {
                &mut self.value
            }

            #[inline]
            fn into_inner(self) -> A {
                self.value
            }
        }
    };
}

padding! {
    /// The default: the cell is exactly as large as its atomic.
    NoPadding => None, Unpadded { ; }
}
padding! {
    /// A pad unit before the atomic.
    PadLeft => Left, LeftPadded { _before ; }
}
padding! {
    /// A pad unit after the atomic.
    PadRight => Right, RightPadded { ; _after }
}
padding! {
    /// A pad unit on each side of the atomic.
    PadBoth => Both, BothPadded { _before ; _after }
}
