use std::sync::Arc;

use atomic_cancelable::{atomic::*, padding::*, AtomicCell, PaddingLayout};
use Ordering::SeqCst;

#[test]
fn supported() {
    struct UsizeWrap(usize);
    struct U8Wrap(bool);
    struct I16Wrap(i16);
    #[repr(align(8))]
    struct U64Align8(u64);

    assert!(AtomicCell::<usize, AtomicUsize>::SUPPORTED);
    assert!(AtomicCell::<isize, AtomicIsize>::SUPPORTED);
    assert!(AtomicCell::<UsizeWrap, AtomicUsize>::SUPPORTED);

    assert!(AtomicCell::<u8, AtomicU8>::SUPPORTED);
    assert!(AtomicCell::<i8, AtomicI8>::SUPPORTED);
    assert!(AtomicCell::<bool, AtomicBool>::SUPPORTED);
    assert!(AtomicCell::<U8Wrap, AtomicU8>::SUPPORTED);

    assert!(AtomicCell::<u16, AtomicU16>::SUPPORTED);
    assert!(AtomicCell::<i16, AtomicI16>::SUPPORTED);
    assert!(AtomicCell::<I16Wrap, AtomicI16>::SUPPORTED);

    assert!(AtomicCell::<u32, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<i32, AtomicI32>::SUPPORTED);
    assert!(AtomicCell::<u64, AtomicU64>::SUPPORTED);
    assert!(AtomicCell::<U64Align8, AtomicU64, PadBoth>::SUPPORTED);

    assert!(AtomicCell::<Option<Box<u32>>, AtomicPtr<u32>>::SUPPORTED);
    assert!(AtomicCell::<Option<Arc<u32>>, AtomicPtr<u32>>::SUPPORTED);

    assert!(!AtomicCell::<u128, AtomicU64>::SUPPORTED);
    assert!(!AtomicCell::<u16, AtomicU8>::SUPPORTED);
}

#[test]
fn ref_supported() {
    assert!(AtomicCell::<u8, AtomicU8>::REF_SUPPORTED);
    assert!(AtomicCell::<[u8; 4], AtomicU32>::REF_SUPPORTED);
    assert!(AtomicCell::<Option<Box<u32>>, AtomicPtr<u32>, PadLeft>::REF_SUPPORTED);
    assert!(AtomicCell::<usize, AtomicUsize>::REF_SUPPORTED);
    assert!(AtomicCell::<u8, AtomicU16>::REF_SUPPORTED);

    assert!(!AtomicCell::<u16, AtomicU8>::REF_SUPPORTED);
}

#[test]
fn compare_and_set_scenario() {
    let cell = AtomicCell::<i32, AtomicI32>::new(5);
    assert!(cell.compare_and_set(5, 9));
    assert_eq!(cell.get(), 9);
    assert!(!cell.compare_and_set(5, 1));
    assert_eq!(cell.get(), 9);
}

#[test]
fn set_get_and_set() {
    let cell = AtomicCell::<u64, AtomicU64, PadRight>::new(1);
    cell.set(2);
    assert_eq!(cell.get(), 2);
    assert_eq!(cell.get_and_set(3), 2);
    cell.lazy_set(4);
    assert_eq!(cell.get(), 4);
    assert_eq!(cell.take(), 4);
    assert_eq!(cell.into_inner(), 0);
}

#[test]
fn lazy_set_is_eventually_visible() {
    let flag = AtomicCell::<bool, AtomicBool>::new(false);
    std::thread::scope(|s| {
        s.spawn(|| flag.lazy_set(true));
        s.spawn(|| while !flag.get() {
            std::hint::spin_loop();
        });
    });
    assert!(flag.get());
}

#[test]
fn padding_is_reported() {
    assert_eq!(AtomicCell::<u8, AtomicU8>::new(0).padding(), PaddingLayout::None);
    assert_eq!(AtomicCell::<u8, AtomicU8, PadLeft>::new(0).padding(), PaddingLayout::Left);
    assert_eq!(AtomicCell::<u8, AtomicU8, PadRight>::LAYOUT, PaddingLayout::Right);
    assert_eq!(AtomicCell::<u8, AtomicU8, PadBoth>::LAYOUT, PaddingLayout::Both);
}

#[test]
fn padded_cells_keep_their_value() {
    let cells = [
        AtomicCell::<u64, AtomicU64, PadBoth>::new(0),
        AtomicCell::<u64, AtomicU64, PadBoth>::new(0),
    ];
    std::thread::scope(|s| {
        for cell in &cells {
            s.spawn(move || {
                for _ in 0..1000 {
                    cell.increment();
                }
            });
        }
    });
    assert_eq!(cells[0].get(), 1000);
    assert_eq!(cells[1].get(), 1000);
}

#[test]
fn get_mut() {
    let mut cell = AtomicCell::<u16, AtomicU16, PadLeft>::new(3);
    *cell.get_mut() += 4;
    assert_eq!(cell.get(), 7);
}

#[test]
fn debug_prints_value() {
    let cell = AtomicCell::<i8, AtomicI8>::new(-3);
    assert_eq!(format!("{:?}", cell), "-3");
}

#[test]
fn drops_u8() {
    static CNT: AtomicUsize = AtomicUsize::new(0);
    CNT.store(0, SeqCst);

    #[derive(Debug, PartialEq, Eq)]
    struct Foo(u8);

    impl Foo {
        fn new(val: u8) -> Foo {
            CNT.fetch_add(1, SeqCst);
            Foo(val)
        }
    }

    impl Drop for Foo {
        fn drop(&mut self) {
            CNT.fetch_sub(1, SeqCst);
        }
    }

    impl Default for Foo {
        fn default() -> Foo {
            Foo::new(0)
        }
    }

    let a = AtomicCell::<_, AtomicU8>::new(Foo::new(5));

    assert_eq!(a.get_and_set(Foo::new(6)), Foo::new(5));
    assert_eq!(a.get_and_set(Foo::new(1)), Foo::new(6));
    assert_eq!(CNT.load(SeqCst), 1);

    a.set(Foo::new(2));
    assert_eq!(CNT.load(SeqCst), 1);

    a.lazy_set(Foo::new(3));
    assert_eq!(CNT.load(SeqCst), 1);

    assert_eq!(a.take(), Foo::new(3));
    assert_eq!(CNT.load(SeqCst), 1);

    drop(a);
    assert_eq!(CNT.load(SeqCst), 0);
}

#[test]
fn drops_boxed() {
    static CNT: AtomicUsize = AtomicUsize::new(0);
    CNT.store(0, SeqCst);

    struct Foo;

    impl Foo {
        fn boxed() -> Option<Box<Foo>> {
            CNT.fetch_add(1, SeqCst);
            Some(Box::new(Foo))
        }
    }

    impl Drop for Foo {
        fn drop(&mut self) {
            CNT.fetch_sub(1, SeqCst);
        }
    }

    let a = AtomicCell::<_, AtomicPtr<Foo>, PadBoth>::new(Foo::boxed());
    a.set(Foo::boxed());
    assert_eq!(CNT.load(SeqCst), 1);

    assert!(a.get_and_set(None).is_some());
    assert_eq!(CNT.load(SeqCst), 0);

    a.set(Foo::boxed());
    let a = a.into_inner();
    assert_eq!(CNT.load(SeqCst), 1);
    drop(a);
    assert_eq!(CNT.load(SeqCst), 0);

    let a = AtomicCell::<_, AtomicPtr<Foo>>::new(Foo::boxed());
    drop(a);
    assert_eq!(CNT.load(SeqCst), 0);
}

#[test]
fn compare_update_raw_with_owned_values() {
    let a = AtomicCell::<_, AtomicPtr<u32>>::new(Some(Box::new(1)));
    let raw_none = AtomicCell::<Option<Box<u32>>, AtomicPtr<u32>>::get_raw(None).1;

    // Only install when empty, getting the allocation back on refusal
    let install = |v: Option<Box<u32>>| {
        a.compare_update_raw::<_, true>(((), raw_none, v, |(), raw: *mut u32, v| {
            if raw == raw_none {
                Ok(((), v))
            } else {
                Err(v)
            }
        }))
    };

    let rejected = install(Some(Box::new(2))).expect_err("cell is occupied");
    assert_eq!(rejected.as_deref(), Some(&2));

    assert_eq!(a.take().as_deref(), Some(&1));
    let previous = install(rejected).expect("cell is empty");
    assert!(previous.is_none());
    assert_eq!(a.into_inner().as_deref(), Some(&2));
}

#[test]
fn aborted_update_stops_at_the_first_retry() {
    let a = AtomicCell::<u32, AtomicU32>::new(3);
    let mut retries = 0;
    let result = a.compare_update_raw::<_, false>((0u32, 7, 8, |_: u32, observed: u32, _: u32| -> Result<(u32, u32), u32> {
        retries += 1;
        Err(observed)
    }));
    assert_eq!(result, Err(3));
    assert_eq!(retries, 1);
    assert_eq!(a.get(), 3);
}

#[test]
fn update_retries_until_the_comparand_matches() {
    let a = AtomicCell::<u32, AtomicU32>::new(3);
    let mut retries = 0;
    let result = a.compare_update_raw::<_, false>((
        0u32,
        7,
        8,
        |count: u32, observed: u32, _: u32| {
            retries += 1;
            Ok::<_, ()>((count + 1, observed + 10))
        },
        |count: u32, prev: u32| (count, prev),
    ));
    assert_eq!(result, Ok((1, 3)));
    assert_eq!(retries, 1);
    assert_eq!(a.get(), 13);
}

#[test]
fn modular_u8() {
    #[derive(Clone, Copy, Eq, Debug, Default)]
    struct Foo(u8);

    impl PartialEq for Foo {
        fn eq(&self, other: &Foo) -> bool {
            self.0 % 5 == other.0 % 5
        }
    }

    let a = AtomicCell::<_, AtomicU8>::new(Foo(1));

    assert_eq!(a.get(), Foo(1));
    assert_eq!(a.get_and_set(Foo(2)), Foo(11));
    assert_eq!(a.get(), Foo(52));

    a.set(Foo(0));
    assert_eq!(a.compare_exchange::<true>(Foo(0), Foo(5)), Ok(Foo(100)));
    assert_eq!(a.get().0, 5);
    assert_eq!(a.compare_exchange::<true>(Foo(10), Foo(15)), Ok(Foo(100)));
    assert_eq!(a.get().0, 15);
    assert!(a.compare_and_set(Foo(20), Foo(3)));
    assert!(!a.compare_and_set(Foo(20), Foo(4)));
    assert_eq!(a.get().0, 3);
}

#[test]
fn modular_usize() {
    #[derive(Clone, Copy, Eq, Debug, Default)]
    struct Foo(usize);

    impl PartialEq for Foo {
        fn eq(&self, other: &Foo) -> bool {
            self.0 % 5 == other.0 % 5
        }
    }

    let a = AtomicCell::<_, AtomicUsize, PadLeft>::new(Foo(1));

    assert_eq!(a.get(), Foo(1));
    assert_eq!(a.get_and_set(Foo(2)), Foo(11));
    assert_eq!(a.get(), Foo(52));

    a.set(Foo(0));
    assert_eq!(a.compare_exchange::<false>(Foo(0), Foo(5)), Ok(Foo(100)));
    assert_eq!(a.get().0, 5);
    assert_eq!(a.compare_exchange::<false>(Foo(10), Foo(15)), Ok(Foo(100)));
    assert_eq!(a.get().0, 15);
}
