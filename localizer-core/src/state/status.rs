//! Fix snapshot and status flags behind one lock
//!
//! Readers always get a copy taken inside a single critical section, so a
//! position group is never observed half-written. Cross-group consistency
//! (e.g. satellites vs. position) is not promised: the two arrive in
//! different sentences.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use localizer_protocol::PositionFix;
use portable_atomic::{AtomicBool, Ordering};

use super::flags::StatusFlags;

/// Maximum number of tasks waiting on flags at the same time
///
/// A further waiter evicts (wakes) the registered ones, which then simply
/// re-register, so this bounds memory rather than correctness.
pub const MAX_WAITERS: usize = 6;

/// Copy of the fix state at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixSnapshot {
    /// Receiver reported a fix in its most recent position sentence
    pub valid: bool,
    /// Last position group received; left untouched when the fix is lost
    pub position: PositionFix,
    /// Most recent group that arrived with a valid marker
    pub last_valid: Option<PositionFix>,
    pub satellites: u8,
}

impl FixSnapshot {
    pub const EMPTY: Self = Self {
        valid: false,
        position: PositionFix::ZERO,
        last_valid: None,
        satellites: 0,
    };

    /// The current position, if the fix is valid
    pub fn current(&self) -> Option<&PositionFix> {
        self.valid.then_some(&self.position)
    }
}

impl Default for FixSnapshot {
    fn default() -> Self {
        Self::EMPTY
    }
}

struct Inner {
    position: PositionFix,
    last_valid: Option<PositionFix>,
    satellites: u8,
    flags: StatusFlags,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

/// Shared fix/status state
pub struct Status<M: RawMutex> {
    inner: Mutex<M, RefCell<Inner>>,
    split: AtomicBool,
}

impl<M: RawMutex> Default for Status<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Status<M> {
    /// Create the state with a zeroed fix and all flags clear
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                position: PositionFix::ZERO,
                last_valid: None,
                satellites: 0,
                flags: StatusFlags::empty(),
                waiters: MultiWakerRegistration::new(),
            })),
            split: AtomicBool::new(false),
        }
    }

    /// Take the write handles
    ///
    /// Returns `None` if the handles were already taken.
    pub fn split(&self) -> Option<StatusWriters<'_, M>> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(StatusWriters {
            fix: FixWriter { status: self },
            link: FlagWriter::new(self, StatusFlags::LINK_CONNECTED),
            clock: FlagWriter::new(self, StatusFlags::CLOCK_SYNCED),
            time_service: FlagWriter::new(self, StatusFlags::TIME_SERVICE_SYNCED),
        })
    }

    /// Read a consistent copy of the fix
    pub fn read_fix(&self) -> FixSnapshot {
        self.inner.lock(|cell| {
            let inner = cell.borrow();
            FixSnapshot {
                valid: inner.flags.contains(StatusFlags::FIX_VALID),
                position: inner.position,
                last_valid: inner.last_valid,
                satellites: inner.satellites,
            }
        })
    }

    /// Current value of all flags
    pub fn flags(&self) -> StatusFlags {
        self.inner.lock(|cell| cell.borrow().flags)
    }

    /// Check whether every flag in `flag` is set
    pub fn get_flag(&self, flag: StatusFlags) -> bool {
        self.flags().contains(flag)
    }

    /// Wait until any flag in `mask` is set
    ///
    /// Resolves with the subset of `mask` that is set.
    pub async fn wait_any(&self, mask: StatusFlags) -> StatusFlags {
        poll_fn(|cx| {
            self.inner.lock(|cell| {
                let mut inner = cell.borrow_mut();
                let hit = inner.flags & mask;
                if !hit.is_empty() {
                    Poll::Ready(hit)
                } else {
                    inner.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    /// Wait until every flag in `mask` is set at the same time
    pub async fn wait_all(&self, mask: StatusFlags) {
        poll_fn(|cx| {
            self.inner.lock(|cell| {
                let mut inner = cell.borrow_mut();
                if inner.flags.contains(mask) {
                    Poll::Ready(())
                } else {
                    inner.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let before = inner.flags;
            let result = f(&mut inner);
            if inner.flags != before {
                inner.waiters.wake();
            }
            result
        })
    }

    /// Set or clear `flag`, returning true if it changed
    fn assign(&self, flag: StatusFlags, value: bool) -> bool {
        self.update(|inner| {
            let changed = inner.flags.contains(flag) != value;
            inner.flags.set(flag, value);
            changed
        })
    }
}

/// Write handles, one per field group
pub struct StatusWriters<'a, M: RawMutex> {
    pub fix: FixWriter<'a, M>,
    pub link: FlagWriter<'a, M>,
    pub clock: FlagWriter<'a, M>,
    pub time_service: FlagWriter<'a, M>,
}

/// Sole writer of the position group, satellites and fix-valid
pub struct FixWriter<'a, M: RawMutex> {
    status: &'a Status<M>,
}

impl<'a, M: RawMutex> FixWriter<'a, M> {
    /// Store a position group received with a valid marker
    ///
    /// The group, `last_valid` and the fix-valid flag change together.
    /// Returns true if the fix was not valid before.
    pub fn write_fix(&mut self, fix: PositionFix) -> bool {
        self.status.update(|inner| {
            inner.position = fix;
            inner.last_valid = Some(fix);
            let acquired = !inner.flags.contains(StatusFlags::FIX_VALID);
            inner.flags.insert(StatusFlags::FIX_VALID);
            acquired
        })
    }

    /// Mark the fix invalid; position data is left untouched
    ///
    /// Returns true if the fix was valid before.
    pub fn clear_fix(&mut self) -> bool {
        self.status.assign(StatusFlags::FIX_VALID, false)
    }

    pub fn write_satellites(&mut self, satellites: u8) {
        self.status.update(|inner| inner.satellites = satellites);
    }
}

/// Sole writer of one status flag
pub struct FlagWriter<'a, M: RawMutex> {
    status: &'a Status<M>,
    flag: StatusFlags,
}

impl<'a, M: RawMutex> FlagWriter<'a, M> {
    fn new(status: &'a Status<M>, flag: StatusFlags) -> Self {
        Self { status, flag }
    }

    /// The flag this handle owns
    pub fn flag(&self) -> StatusFlags {
        self.flag
    }

    /// Set the flag, returning true on a rising edge
    pub fn set(&mut self) -> bool {
        self.status.assign(self.flag, true)
    }

    /// Clear the flag, returning true on a falling edge
    pub fn clear(&mut self) -> bool {
        self.status.assign(self.flag, false)
    }

    pub fn get(&self) -> bool {
        self.status.get_flag(self.flag)
    }
}
