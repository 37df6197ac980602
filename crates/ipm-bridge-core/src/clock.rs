// crates/ipm-bridge-core/src/clock.rs
// ============================================================================
// Module: Injectable Clock
// Description: Time source abstraction for default request time windows.
// Purpose: Keep the resolver deterministic by making "now" an explicit input.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The resolver needs a notion of "now" when a forecast source requires a
//! time window and the caller supplied none. Reading the wall clock inside
//! the resolver would make its output irreproducible, so the time source is
//! a trait: production code passes [`SystemClock`], tests pass a
//! [`FixedClock`] pinned to a known instant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

// ============================================================================
// SECTION: Clock Trait
// ============================================================================

/// Time source used for defaulted time windows.
///
/// # Invariants
/// - Implementations return timestamps with an explicit UTC offset.
/// - The resolver calls `now` at most once per resolution.
pub trait Clock {
    /// Returns the current instant with an explicit offset.
    fn now(&self) -> OffsetDateTime;
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Wall-clock time source for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Fixed time source for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
