//! Lock-free building blocks for concurrent code: a thread-safe mutable
//! memory location called [`AtomicCell`], and a family of one-shot
//! [cancelation tokens](cancelable).
//!
//! # How it Works
//!
//! When constructing an `AtomicCell`, callers select an [`AtomicStorage`]
//! implementation that will fit the data they wish to store (e.g. `AtomicU8`
//! can be used to hold a `#[repr(u8)]` enum, and `AtomicPtr<U>` an
//! `Option<Box<U>>`).
//!
//! Under the hood, the value is transmuted to the corresponding base type of
//! the storage, and atomic operations are executed on the storage. Pairing a
//! type with storage of a different size fails to compile.
//!
//! Every compound operation, from [`AtomicCell::compare_and_set`] to the
//! counting operations such as [`AtomicCell::increment_and_get`] and
//! [`AtomicCell::count_down_to_zero`], is a compare-and-set retry loop: no
//! operation ever takes a lock or blocks.
//!
//! Cells written by different threads can be kept off each other's cache
//! lines with the [`padding`] type parameter.
//!
//! The [`MultiAssignmentCancelable`] keeps its state in an `AtomicCell`, so
//! assigning a target and canceling are resolved by whichever
//! compare-and-set commits first.
//!
//! # Features
//!
//! - `tracing`: emit TRACE events on cancelation transitions.
//!
//! [`AtomicStorage`]: atomic::AtomicStorage
//! [`MultiAssignmentCancelable`]: cancelable::MultiAssignmentCancelable
#![no_std]

extern crate alloc;

pub mod atomic;
pub mod cancelable;
mod cell;
pub mod compare_update;
pub mod numeric;
pub mod padding;
mod utils;

pub use cancelable::Cancelable;
pub use cell::AtomicCell;
pub use numeric::Numeric;
pub use padding::PaddingLayout;
