use std::alloc::{GlobalAlloc, Layout, System};
use std::any::Any;
use std::borrow::Borrow;
use std::cell::Cell;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::panic::{catch_unwind, AssertUnwindSafe, UnwindSafe};
use std::ptr;
use std::sync::atomic::Ordering::{AcqRel, Relaxed};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize};
use std::sync::PoisonError;

use striped_hash_set::{CoarseGrainedHashSet, Error, SequentialHashSet, StripedHashSet};

use crate::SERIALIZER;

struct OOMAllocator;

unsafe impl GlobalAlloc for OOMAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        match injected_failure() {
            Some(Failure::Panic) => panic!("Emulate failure"),
            Some(Failure::Null) => return ptr::null_mut(),
            None => (),
        }
        // This does not work nicely in the release mode.
        panic_if(|| rand::random::<u32>() % (2 + PANIC_COUNT.load(Relaxed)) == 0);
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: OOMAllocator = OOMAllocator;

static OOM_TEST: AtomicBool = AtomicBool::new(false);
static IN_PANIC: AtomicBool = AtomicBool::new(false);
static PANIC_COUNT: AtomicU32 = AtomicU32::new(0);

/// How an injected allocation failure manifests itself.
#[derive(Clone, Copy, Debug)]
enum Failure {
    Panic,
    Null,
}

thread_local! {
    /// The number of allocations to let through before failing one.
    static INJECTION: Cell<Option<(usize, Failure)>> = const { Cell::new(None) };
}

fn injected_failure() -> Option<Failure> {
    INJECTION
        .try_with(|injection| match injection.get() {
            Some((0, failure)) => {
                injection.set(None);
                Some(failure)
            }
            Some((n, failure)) => {
                injection.set(Some((n - 1, failure)));
                None
            }
            None => None,
        })
        .ok()
        .flatten()
}

/// Fails the allocation made by the current thread after `nth` successful ones.
fn inject(nth: usize, failure: Failure) {
    INJECTION.with(|injection| injection.set(Some((nth, failure))));
}

/// Cancels a pending injection, and returns `true` if the failure was triggered.
fn disarm() -> bool {
    INJECTION.with(|injection| injection.take().is_none())
}

fn panic_if<F: FnOnce() -> bool>(f: F) {
    if OOM_TEST.load(Relaxed) && !IN_PANIC.load(Relaxed) {
        IN_PANIC.swap(true, Relaxed);
        if f() {
            IN_PANIC.store(true, Relaxed);
            PANIC_COUNT.fetch_add(1, Relaxed);
            panic!("Emulate failure");
        } else {
            IN_PANIC.store(false, Relaxed);
        }
    }
}

pub(crate) struct ExitGuard<F: FnOnce()> {
    drop_callback: Option<F>,
}

impl<F: FnOnce()> ExitGuard<F> {
    #[inline]
    const fn new(drop_callback: F) -> Self {
        Self {
            drop_callback: Some(drop_callback),
        }
    }
}

impl<F: FnOnce()> Drop for ExitGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.drop_callback.take() {
            f();
        }
    }
}

/// A key that owns heap memory and counts its live instances.
struct R {
    id: usize,
    counter: Box<&'static AtomicUsize>,
}

impl R {
    fn new(id: usize, cnt: &'static AtomicUsize) -> R {
        let counter = Box::new(cnt);
        cnt.fetch_add(1, AcqRel);
        R { id, counter }
    }
}

impl Drop for R {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, AcqRel);
    }
}

impl Borrow<usize> for R {
    fn borrow(&self) -> &usize {
        &self.id
    }
}

impl Eq for R {}

impl Hash for R {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialEq for R {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

static INST_CNT: AtomicUsize = AtomicUsize::new(0);

fn test_oom<F: FnOnce() + Send + UnwindSafe>(f: F) -> Result<(), Box<dyn Any + Send>> {
    let result = catch_unwind(|| {
        OOM_TEST.store(true, Relaxed);
        let _guard = ExitGuard::new(|| {
            OOM_TEST.store(false, Relaxed);
        });
        f();
    });
    IN_PANIC.store(false, Relaxed);
    result
}

fn run_test<F: FnOnce(usize)>(f: F, repeat: usize) {
    PANIC_COUNT.store(0, Relaxed);
    f(repeat);
    assert_eq!(INST_CNT.load(Relaxed), 0);
}

/// Checks the set after an insertion attempt.
///
/// A failed attempt may or may not have inserted the key, since the allocation may have failed in
/// the resize that followed the insertion; either way the size must match the content.
fn check_insertion<C: Fn(usize) -> bool>(
    contains: C,
    len: usize,
    k: usize,
    succeeded: bool,
    present: &mut usize,
) {
    let inserted = contains(k);
    assert!(!succeeded || inserted, "{k}");
    if inserted {
        *present += 1;
    }
    assert_eq!(len, *present);
}

fn sequential_panic_oom(repeat: usize) {
    let mut hashset: SequentialHashSet<R> = SequentialHashSet::with_capacity(2);
    let mut present = 0;
    for k in 0..repeat {
        let mut target = AssertUnwindSafe(&mut hashset);
        let result: Result<(), Box<dyn Any + Send>> = test_oom(move || {
            target.insert(R::new(k, &INST_CNT));
        });
        check_insertion(
            |k| hashset.contains(&k),
            hashset.len(),
            k,
            result.is_ok(),
            &mut present,
        );
    }
    for k in 0..repeat {
        assert_eq!(hashset.contains(&k), hashset.remove(&k));
    }
    assert!(hashset.is_empty());
    drop(hashset);
}

fn coarse_grained_panic_oom(repeat: usize) {
    let hashset: CoarseGrainedHashSet<R> = CoarseGrainedHashSet::with_capacity(2);
    let mut present = 0;
    for k in 0..repeat {
        let result: Result<(), Box<dyn Any + Send>> = test_oom(|| {
            hashset.insert(R::new(k, &INST_CNT));
        });
        check_insertion(
            |k| hashset.contains(&k),
            hashset.len(),
            k,
            result.is_ok(),
            &mut present,
        );
    }
    drop(hashset);
}

fn striped_panic_oom(repeat: usize) {
    let hashset: StripedHashSet<R> = StripedHashSet::with_capacity(2);
    let mut present = 0;
    for k in 0..repeat {
        let result: Result<(), Box<dyn Any + Send>> = test_oom(|| {
            hashset.insert(R::new(k, &INST_CNT));
        });
        check_insertion(
            |k| hashset.contains(&k),
            hashset.len(),
            k,
            result.is_ok(),
            &mut present,
        );
    }
    assert_eq!(hashset.lock_count(), 2);
    for k in 0..repeat {
        let was_present = hashset.contains(&k);
        assert_eq!(hashset.remove(&k), was_present);
    }
    assert!(hashset.is_empty());
    drop(hashset);
}

#[derive(Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 = (self.0 << 8) | u64::from(*byte);
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }
}

type Identity = BuildHasherDefault<IdentityHasher>;

/// Returns a set with two buckets holding nine keys; one more key exceeds the load factor.
///
/// Even keys share stripe 0 and odd keys share stripe 1, and inserting key 10 afterwards does not
/// allocate, so every allocation made by the next insertion belongs to the resize.
fn nine_keys() -> StripedHashSet<u64, Identity> {
    let hashset = StripedHashSet::with_capacity_and_hasher(2, Identity::default());
    for k in 0..9 {
        assert!(hashset.insert(k));
    }
    assert_eq!(hashset.capacity(), 2);
    hashset
}

/// Checks that a failed resize left the set unchanged, and that the set grows again afterwards.
fn check_after_failed_resize(hashset: &StripedHashSet<u64, Identity>) {
    assert_eq!(hashset.capacity(), 2);
    assert_eq!(hashset.lock_count(), 2);
    assert_eq!(hashset.len(), 10);
    for k in (0..9).chain([10]) {
        assert!(hashset.contains(&k), "{k}");
    }

    assert!(hashset.insert(11));
    assert_eq!(hashset.capacity(), 4);
    assert_eq!(hashset.len(), 11);
    for k in (0..9).chain(10..12) {
        assert!(hashset.contains(&k), "{k}");
    }
    assert!(!hashset.contains(&9));
}

#[cfg_attr(miri, ignore)]
#[test]
fn striped_resize_out_of_memory() {
    let _guard = SERIALIZER.lock().unwrap_or_else(PoisonError::into_inner);

    let mut failures = 0;
    let mut grown = false;
    for nth in 0..64 {
        let hashset = nine_keys();
        inject(nth, Failure::Null);
        let result = hashset.try_insert(10);
        if !disarm() {
            // Every allocation of the resize succeeded.
            assert_eq!(result, Ok(true));
            assert_eq!(hashset.capacity(), 4);
            grown = true;
            break;
        }
        assert_eq!(result, Err(Error::OutOfMemory));
        check_after_failed_resize(&hashset);
        failures += 1;
    }
    assert!(failures > 0);
    assert!(grown);
}

#[cfg_attr(miri, ignore)]
#[test]
fn striped_resize_panic() {
    let _guard = SERIALIZER.lock().unwrap_or_else(PoisonError::into_inner);

    let mut failures = 0;
    let mut grown = false;
    for nth in 0..64 {
        let hashset = nine_keys();
        inject(nth, Failure::Panic);
        let result = catch_unwind(|| hashset.try_insert(10));
        if !disarm() {
            assert!(matches!(result, Ok(Ok(true))));
            assert_eq!(hashset.capacity(), 4);
            grown = true;
            break;
        }
        assert!(result.is_err());
        check_after_failed_resize(&hashset);
        failures += 1;
    }
    assert!(failures > 0);
    assert!(grown);
}

#[cfg_attr(miri, ignore)]
#[test]
fn oom_panic_safety() {
    let _guard = SERIALIZER.lock().unwrap_or_else(PoisonError::into_inner);

    let repeat = (rand::random::<u32>() % 64 + 256) as usize;

    run_test(sequential_panic_oom, repeat);
    run_test(coarse_grained_panic_oom, repeat);
    run_test(striped_panic_oom, repeat);
}
