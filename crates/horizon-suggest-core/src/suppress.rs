//! Re-entrancy suppression utilities.
//!
//! The suggestion engine writes state (text, selection, search text) that
//! loops straight back into it as host notifications. These utilities mark
//! those self-inflicted notifications so the pipeline can ignore them:
//!
//! - [`ReentrancyGuard`] - scoped depth counter; hold a [`SuppressScope`]
//!   while performing a write whose echo should be ignored
//! - [`SkipFlag`] - armed once, consumed once; for "skip exactly the next
//!   notification" interactions
//!
//! Both are plain atomics so a guard can live inside a shared engine without
//! `&mut` access.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A scoped re-entrancy counter.
///
/// Entering returns a [`SuppressScope`] that increments the depth and
/// decrements it again on drop. Scopes nest; suppression is active while any
/// scope is alive.
///
/// # Example
///
/// ```
/// use horizon_suggest_core::ReentrancyGuard;
///
/// let guard = ReentrancyGuard::new();
/// assert!(!guard.is_suppressed());
/// {
///     let _scope = guard.enter();
///     assert!(guard.is_suppressed());
///     {
///         let _inner = guard.enter();
///         assert!(guard.is_suppressed());
///     }
///     assert!(guard.is_suppressed());
/// }
/// assert!(!guard.is_suppressed());
/// ```
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    depth: Arc<AtomicUsize>,
}

impl ReentrancyGuard {
    /// Create a guard with no active scopes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a suppression scope. Suppression stays active until the returned
    /// scope (and any nested scopes) drop.
    pub fn enter(&self) -> SuppressScope {
        self.depth.fetch_add(1, Ordering::SeqCst);
        SuppressScope {
            depth: self.depth.clone(),
        }
    }

    /// Whether any suppression scope is currently alive.
    pub fn is_suppressed(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

/// RAII scope returned by [`ReentrancyGuard::enter`].
#[derive(Debug)]
pub struct SuppressScope {
    depth: Arc<AtomicUsize>,
}

impl Drop for SuppressScope {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A consume-once boolean flag.
///
/// [`arm`](Self::arm) sets the flag; the next [`take`](Self::take) returns
/// `true` and clears it. Arming twice before a take is the same as arming
/// once.
#[derive(Debug, Default)]
pub struct SkipFlag {
    armed: AtomicBool,
}

impl SkipFlag {
    /// Create an unarmed flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the flag for the next `take`.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Consume the flag. Returns `true` if it was armed, clearing it.
    pub fn take(&self) -> bool {
        self.armed.swap(false, Ordering::SeqCst)
    }

    /// Whether the flag is currently armed, without consuming it.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}
