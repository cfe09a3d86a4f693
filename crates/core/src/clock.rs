// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable wall-clock time
//!
//! Run state timestamps and token expiry checks are wall-clock values, so the
//! clock hands out `DateTime<Utc>` rather than monotonic instants.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A clock that provides the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock shared between the engine and the connectors it binds
pub type SharedClock = Arc<dyn Clock>;

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// A shared handle to the system clock
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::Clock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    /// Fake clock for testing with controllable time
    #[derive(Clone)]
    pub struct FakeClock {
        current: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FakeClock {
        /// Starts at 2026-01-01T00:00:00Z so tests get stable timestamps
        pub fn new() -> Self {
            let start = Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);
            Self::at(start)
        }

        pub fn at(time: DateTime<Utc>) -> Self {
            Self {
                current: Arc::new(Mutex::new(time)),
            }
        }

        /// Advance the clock by the given duration
        pub fn advance(&self, duration: Duration) {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            *current += duration;
        }

        /// Set the clock to a specific time
        pub fn set(&self, time: DateTime<Utc>) {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            *current = time;
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock().unwrap_or_else(|e| e.into_inner())
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
