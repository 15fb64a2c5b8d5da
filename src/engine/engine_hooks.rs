//! engine::engine_hooks
//!
//! Test-only fault injection for the lock transition.
//!
//! # Architecture
//!
//! Lock has two reversible steps before its point of no return: the primary
//! copy (verified by digest) and the backup copy. These hooks let tests make
//! either step fail so the cleanup paths can be checked without corrupting a
//! real disk.
//!
//! # Usage
//!
//! ```ignore
//! use linkvault::engine::engine_hooks::{self, FaultPoint};
//!
//! engine_hooks::arm(FaultPoint::BackupCopy);
//! let result = lock_file(&session, &mut manifest, &rel, false);
//! assert!(result.is_err());
//! engine_hooks::reset(); // Always clean up!
//! ```
//!
//! # Thread Safety
//!
//! State is thread-local, so tests running in parallel threads do not see
//! each other's faults.
//!
//! # Invariants
//!
//! - Only compiled under `cfg(test)` or the `fault_injection` feature
//! - An armed fault fires once and then disarms itself

use std::cell::Cell;

/// A step of the lock transition that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Flip a byte of the primary copy right after it is written, so the
    /// verification digest no longer matches.
    CorruptPrimary,
    /// Fail the copy from primary to backup with an I/O error.
    BackupCopy,
}

thread_local! {
    static ARMED: Cell<Option<FaultPoint>> = const { Cell::new(None) };
}

/// Arm a fault for the next time its step runs on this thread.
pub fn arm(point: FaultPoint) {
    ARMED.with(|a| a.set(Some(point)));
}

/// Disarm any pending fault.
pub fn reset() {
    ARMED.with(|a| a.set(None));
}

/// Check whether a fault is pending.
pub fn is_armed() -> bool {
    ARMED.with(|a| a.get().is_some())
}

/// Consume the fault if `point` is armed.
pub(crate) fn fires(point: FaultPoint) -> bool {
    ARMED.with(|a| {
        if a.get() == Some(point) {
            a.set(None);
            true
        } else {
            false
        }
    })
}
