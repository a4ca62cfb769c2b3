use core::fmt;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::LazyLock;

// Recognized formats, most specific first. The cascade order matters: a
// canonical identifier must win over the bare digit-run fallback so that
// stray digits elsewhere in a string cannot shadow its numeral.
static PREFIXED_3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:ORD|ORDER)-(\d{3})$").expect("valid pattern"));
static PREFIXED_6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:ORD|ORDER)-(\d{6})$").expect("valid pattern"));
static PREFIXED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:ORD|ORDER)-(\d+)$").expect("valid pattern"));
static BARE_FIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3}|\d{6})$").expect("valid pattern"));
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("valid pattern"));

/// A sequential order identifier.
///
/// Wraps the positive sequence number behind an `ORD-` prefixed, zero-padded
/// rendering. The canonical wire format pads to 3 digits (`ORD-007`); the
/// width simply grows once the sequence passes 999 (`ORD-1000`).
///
/// Parsing is deliberately more permissive than formatting: order lists
/// accumulate identifiers written by older tooling (`ORDER-` prefix, 6-digit
/// padding, bare numerals), and all of those must still contribute to the
/// allocator's high-water mark.
///
/// # Example
///
/// ```
/// use ordseq::OrderId;
///
/// let id = OrderId::parse_lenient("ORDER-000123").unwrap();
/// assert_eq!(id.sequence(), 123);
/// assert_eq!(id.to_string(), "ORD-123");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(u64);

impl OrderId {
    /// The prefix used when rendering identifiers.
    pub const PREFIX: &'static str = "ORD";

    pub(crate) const fn from_raw(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Creates an identifier from a sequence number.
    ///
    /// Returns `None` for 0: sequence numbers start at 1, and a parsed 0 is
    /// indistinguishable from garbage input.
    pub fn from_sequence(sequence: u64) -> Option<Self> {
        (sequence > 0).then_some(Self(sequence))
    }

    /// The numeric sequence component.
    pub const fn sequence(self) -> u64 {
        self.0
    }

    /// Extracts a sequence number from a raw identifier string, tolerating
    /// legacy formats.
    ///
    /// Patterns are attempted in order; the first one that yields a positive
    /// integer wins:
    ///
    /// 1. `ORD-`/`ORDER-` + exactly 3 digits (canonical, case-insensitive)
    /// 2. `ORD-`/`ORDER-` + exactly 6 digits (legacy padding)
    /// 3. `ORD-`/`ORDER-` + any digit width
    /// 4. a bare 3- or 6-digit numeral
    /// 5. the first digit run found anywhere in the string
    ///
    /// A parsed value of 0 is rejected and the cascade continues. Returns
    /// `None` when nothing matches; never panics.
    ///
    /// # Example
    ///
    /// ```
    /// use ordseq::OrderId;
    ///
    /// assert_eq!(OrderId::parse_lenient("ORD-007").map(|id| id.sequence()), Some(7));
    /// assert_eq!(OrderId::parse_lenient("042").map(|id| id.sequence()), Some(42));
    /// assert_eq!(OrderId::parse_lenient("abc"), None);
    /// ```
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        [
            &PREFIXED_3,
            &PREFIXED_6,
            &PREFIXED_ANY,
            &BARE_FIXED,
            &DIGIT_RUN,
        ]
        .into_iter()
        .find_map(|re| capture_sequence(re, raw))
        .map(Self)
    }
}

fn capture_sequence(re: &Regex, raw: &str) -> Option<u64> {
    let digits = re.captures(raw)?.get(1)?.as_str();
    match digits.parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", Self::PREFIX, self.0)
    }
}

impl Serialize for OrderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
