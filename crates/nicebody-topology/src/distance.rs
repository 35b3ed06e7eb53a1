//! Exact distance values.
//!
//! Distances are only ever compared and grouped, never summed, so they are
//! kept as reduced fractions. Two pairs that are "equally far" then compare
//! equal exactly, which floating point cannot promise.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative rational distance, always stored in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Distance {
    num: u32,
    den: u32,
}

impl Distance {
    /// Distance between a region and itself.
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// Upper bound (exclusive) of every tag distance.
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Create a distance `num / den`, reduced.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn new(num: u32, den: u32) -> Self {
        assert!(den != 0, "distance denominator must be non-zero");
        if num == 0 {
            return Self::ZERO;
        }
        let g = gcd(num, den);
        Self {
            num: num / g,
            den: den / g,
        }
    }

    /// Numerator in lowest terms.
    pub const fn numerator(&self) -> u32 {
        self.num
    }

    /// Denominator in lowest terms.
    pub const fn denominator(&self) -> u32 {
        self.den
    }

    /// Whether this is the zero distance.
    pub const fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Lossy conversion for display and reports.
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Default for Distance {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as u64 * other.den as u64;
        let rhs = other.num as u64 * self.den as u64;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_f64())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Distance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_to_lowest_terms() {
        let d = Distance::new(4, 20);
        assert_eq!(d.numerator(), 1);
        assert_eq!(d.denominator(), 5);
        assert_eq!(d, Distance::new(1, 5));
    }

    #[test]
    fn zero_has_single_representation() {
        assert_eq!(Distance::new(0, 30), Distance::ZERO);
        assert!(Distance::new(0, 7).is_zero());
    }

    #[test]
    fn ordering_is_by_value() {
        assert!(Distance::new(1, 30) < Distance::new(1, 10));
        assert!(Distance::new(1, 10) < Distance::new(2, 10));
        assert!(Distance::new(1, 2) > Distance::new(1, 20));
        assert_eq!(
            Distance::new(2, 30).cmp(&Distance::new(1, 15)),
            Ordering::Equal
        );
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(Distance::new(1, 4).to_string(), "0.250");
    }
}
