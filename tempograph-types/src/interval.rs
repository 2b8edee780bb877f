use serde::{Deserialize, Serialize};

/// A half-open validity range `[start, end)` on the timeline.
///
/// `start == end` denotes an instantaneous event. Either bound may be an
/// infinity: `-inf` means "since the beginning of time" and `+inf` means
/// "until further notice".
///
/// # Examples
///
/// ```
/// use tempograph_types::interval::Interval;
///
/// let open = Interval::from_bounds(Some(5.0), None);
/// assert!(open.is_open_ended());
/// assert!(open.contains_time(1_000.0));
/// assert!(!open.contains_time(4.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Create an interval without validating it.
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Interval covering the whole timeline.
    pub const fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Interval starting at `start` and valid until further notice.
    pub const fn open(start: f64) -> Self {
        Self::new(start, f64::INFINITY)
    }

    /// Build an interval from optional bounds, defaulting the missing ones
    /// to the timeline sentinels.
    pub fn from_bounds(start: Option<f64>, end: Option<f64>) -> Self {
        Self::new(
            start.unwrap_or(f64::NEG_INFINITY),
            end.unwrap_or(f64::INFINITY),
        )
    }

    /// True when neither bound is NaN and `start <= end`.
    pub fn is_well_formed(&self) -> bool {
        !self.start.is_nan() && !self.end.is_nan() && self.start <= self.end
    }

    pub fn is_open_ended(&self) -> bool {
        self.end == f64::INFINITY
    }

    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    /// Open overlap test against a window: `start < window.high && end > window.low`.
    ///
    /// An interval that merely touches the window boundary does not overlap it.
    pub fn overlaps(&self, window: &Window) -> bool {
        self.start < window.high && self.end > window.low
    }

    /// Whether the instant `t` lies inside the interval.
    ///
    /// Half-open containment, except that an instantaneous interval contains
    /// its own time stamp.
    pub fn contains_time(&self, t: f64) -> bool {
        if self.is_instant() {
            return self.start == t;
        }
        self.start <= t && t < self.end
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The `[low, high)` range a renderer currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub low: f64,
    pub high: f64,
}

impl Window {
    /// A window no interval can overlap. Use it as the "previous" window of
    /// the very first query.
    pub const EMPTY: Window = Window {
        low: f64::NEG_INFINITY,
        high: f64::NEG_INFINITY,
    };

    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// A zero-width window at `t`.
    pub const fn point(t: f64) -> Self {
        Self::new(t, t)
    }

    pub fn is_well_formed(&self) -> bool {
        !self.low.is_nan() && !self.high.is_nan() && self.low <= self.high
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}
