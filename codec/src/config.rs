//! Limits applied while decoding untrusted input.
//!
//! Every input protocol is constructed with a [Limits] value. Lengths advertised by the
//! byte stream (strings, binaries, list/set/map entry counts) are checked against the
//! configured ranges before anything is allocated, and nested structures are bounded by
//! a maximum depth.

use core::ops::{
    Bound, Range, RangeBounds, RangeFrom, RangeFull, RangeInclusive, RangeToInclusive,
};

/// Default maximum length (in bytes) of a decoded string or binary value.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum number of entries in a decoded list, set or map.
pub const DEFAULT_MAX_CONTAINER_LENGTH: usize = 1 << 20;

/// Default maximum nesting depth of records and containers.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Accepted range of a length read from the wire.
///
/// ```
/// use recwire_codec::RangeCfg;
///
/// let cfg: RangeCfg<usize> = (1..=1024).into();
/// assert!(cfg.contains(&500));
/// assert!(!cfg.contains(&0));
/// assert!(!cfg.contains(&2000));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RangeCfg<T: Copy + PartialOrd> {
    start: Bound<T>,
    end: Bound<T>,
}

macro_rules! impl_from_range {
    ($($range:ty),*) => {
        $(
            impl<T: Copy + PartialOrd> From<$range> for RangeCfg<T> {
                fn from(r: $range) -> Self {
                    Self::new(r)
                }
            }
        )*
    };
}

impl_from_range!(
    Range<T>,
    RangeInclusive<T>,
    RangeFrom<T>,
    RangeToInclusive<T>
);

impl<T: Copy + PartialOrd> From<RangeFull> for RangeCfg<T> {
    fn from(_: RangeFull) -> Self {
        Self::new(..)
    }
}

impl<T: Copy + PartialOrd> RangeCfg<T> {
    pub fn new(r: impl RangeBounds<T>) -> Self {
        Self {
            start: r.start_bound().cloned(),
            end: r.end_bound().cloned(),
        }
    }

    /// Returns true if `value` is within the range.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        RangeBounds::contains(self, value)
    }
}

impl<T: Copy + PartialOrd> RangeBounds<T> for RangeCfg<T> {
    fn start_bound(&self) -> Bound<&T> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&T> {
        self.end.as_ref()
    }
}

/// Limits enforced by input protocols.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Accepted lengths (in bytes) of strings and binaries.
    pub string_length: RangeCfg<usize>,

    /// Accepted entry counts of lists, sets and maps.
    pub container_length: RangeCfg<usize>,

    /// Maximum nesting depth of records and containers.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            string_length: RangeCfg::new(..=DEFAULT_MAX_STRING_LENGTH),
            container_length: RangeCfg::new(..=DEFAULT_MAX_CONTAINER_LENGTH),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Limits {
    /// Limits that accept any length the wire format can express.
    ///
    /// Only appropriate for input produced by a trusted peer.
    pub fn unbounded() -> Self {
        Self {
            string_length: RangeCfg::from(..),
            container_length: RangeCfg::from(..),
            max_depth: usize::MAX,
        }
    }

    /// Returns a copy of these limits with a different maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
