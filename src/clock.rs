//! Injected clock seam
//!
//! The stamper's only side effect is a clock read when the caller omits an
//! explicit base instant. Routing that read through a trait lets the
//! reproducible path (explicit `base_dt`) and the convenience path
//! (implicit "now") share one implementation, and lets tests pin time.

use chrono::{DateTime, Utc};

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Reads the system clock. The default for interactive use; the resulting
/// timestamps are not reproducible across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the instant it was constructed with.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
