//! Timestamps counted in 100-nanosecond intervals since the UUID epoch and the sources that
//! produce them.

use std::{fmt, thread, time};

/// Number of 100-nanosecond intervals between the UUID epoch (1582-10-15) and the Unix epoch.
const UNIX_EPOCH_TICKS: u64 = 0x01b2_1dd2_1381_4000;

/// Default spin resolution of [`Spinner`].
pub const DEFAULT_RESOLUTION: u32 = 1024;

/// Lower bound of the time [`Spinner`] waits for the host clock to advance.
const MIN_SPIN_WAIT: time::Duration = time::Duration::from_millis(20);

/// Represents a count of 100-nanosecond intervals since 00:00:00.00, 15 October 1582.
///
/// Only the low 60 bits are encoded into a UUID.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from a raw tick count.
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Creates a timestamp from a Unix time.
    pub const fn from_unix(secs: u64, nanos: u32) -> Self {
        Self(UNIX_EPOCH_TICKS + secs * 10_000_000 + nanos as u64 / 100)
    }

    /// Reads the system clock.
    pub fn now() -> Self {
        match time::SystemTime::now().duration_since(time::UNIX_EPOCH) {
            Ok(elapsed) => Self(UNIX_EPOCH_TICKS + (elapsed.as_nanos() / 100) as u64),
            // clock set before 1970
            Err(err) => {
                Self(UNIX_EPOCH_TICKS.saturating_sub((err.duration().as_nanos() / 100) as u64))
            }
        }
    }

    /// Returns the raw tick count.
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the timestamp as a duration since the Unix epoch, or `None` if it predates it.
    pub fn to_unix(self) -> Option<time::Duration> {
        let ticks = self.0.checked_sub(UNIX_EPOCH_TICKS)?;
        Some(time::Duration::new(
            ticks / 10_000_000,
            (ticks % 10_000_000) as u32 * 100,
        ))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A trait that supplies the timestamps of time-based UUIDs.
///
/// Implementations are only ever called while the generator holds its lock.
pub trait TimeSource: Send {
    /// Returns the timestamp for the next identifier.
    fn next(&mut self) -> Timestamp;
}

/// Default [`TimeSource`] that serves up to `resolution` distinct timestamps per tick of the host
/// clock.
///
/// When the clock reading does not exceed the last emitted timestamp, the spinner emits the last
/// timestamp plus one. After `resolution - 1` such artificial ticks in a row it waits for the host
/// clock to catch up. The wait ends after a bounded time or as soon as the clock is seen moving
/// backward, in which case the fresh reading is returned as is and the generator disambiguates it
/// with the clock sequence.
pub struct Spinner<C = fn() -> Timestamp> {
    clock: C,
    last: Timestamp,
    count: u32,
    resolution: u32,
}

impl Spinner {
    /// Creates a spinner reading the system clock.
    pub fn new(resolution: u32) -> Self {
        Self::with_clock(resolution, Timestamp::now)
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl<C: FnMut() -> Timestamp> Spinner<C> {
    /// Creates a spinner reading an arbitrary clock.
    pub fn with_clock(resolution: u32, clock: C) -> Self {
        Self {
            clock,
            last: Timestamp::default(),
            count: 0,
            resolution: resolution.max(1),
        }
    }

    /// Returns the configured spin resolution.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    fn advance_to(&mut self, now: Timestamp) -> Timestamp {
        self.last = now;
        self.count = 0;
        now
    }

    fn wait_for_clock(&mut self) -> Timestamp {
        let floor = (self.clock)();
        let budget = time::Duration::from_nanos(100 * self.resolution as u64).max(MIN_SPIN_WAIT);
        let deadline = time::Instant::now() + budget;
        loop {
            let now = (self.clock)();
            if now > self.last {
                return self.advance_to(now);
            }
            if now < floor {
                log::debug!("rfc4122: clock moved backward while spinning");
                return self.advance_to(now);
            }
            if time::Instant::now() >= deadline {
                log::warn!(
                    "rfc4122: clock did not advance within {:?}; reusing timestamp {}",
                    budget,
                    now
                );
                return self.advance_to(now);
            }
            thread::yield_now();
        }
    }
}

impl<C: FnMut() -> Timestamp + Send> TimeSource for Spinner<C> {
    fn next(&mut self) -> Timestamp {
        let now = (self.clock)();
        if now > self.last {
            self.advance_to(now)
        } else if self.count + 1 < self.resolution {
            self.count += 1;
            self.last = Timestamp(self.last.0 + 1);
            self.last
        } else {
            self.wait_for_clock()
        }
    }
}
