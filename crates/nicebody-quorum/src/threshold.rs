//! Quorum size, liveness and safety arithmetic.
//!
//! With `F` tolerated failures, `U` the union of two regions' validators and
//! `C` the validators both regions trust:
//!
//! ```text
//! min size:  |Q| >= 3F + 1
//! liveness:  |U| - |C| >= F
//! safety:    2|C| - |U| - 1 >= F
//! ```
//!
//! Margins are the slack in each inequality. A negative margin is a failed
//! check, zero is the tightest passing value.

use serde::Serialize;

/// Minimum number of validators a quorum needs to survive `failure` faults.
///
/// # Examples
///
/// ```
/// use nicebody_quorum::min_quorum_size;
///
/// assert_eq!(min_quorum_size(1), 4);
/// assert_eq!(min_quorum_size(3), 10);
/// ```
pub const fn min_quorum_size(failure: usize) -> usize {
    3 * failure + 1
}

/// Slack of `|Q| >= 3F + 1` for a quorum of `quorum` validators.
pub fn min_size_margin(quorum: usize, failure: usize) -> i64 {
    quorum as i64 - min_quorum_size(failure) as i64
}

/// Slack of `|U| - |C| >= F`.
pub fn liveness_margin(union: usize, common: usize, failure: usize) -> i64 {
    union as i64 - common as i64 - failure as i64
}

/// Slack of `2|C| - |U| - 1 >= F`.
pub fn safety_margin(union: usize, common: usize, failure: usize) -> i64 {
    2 * common as i64 - union as i64 - 1 - failure as i64
}

/// The same check evaluated for both regions of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MarginPair {
    pub a: i64,
    pub b: i64,
}

impl MarginPair {
    pub const fn new(a: i64, b: i64) -> Self {
        Self { a, b }
    }

    /// Both sides pass.
    pub const fn holds(&self) -> bool {
        self.a >= 0 && self.b >= 0
    }

    pub const fn sum(&self) -> i64 {
        self.a + self.b
    }
}

/// All margins of one candidate common set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Margins {
    pub min_size: MarginPair,
    pub liveness: MarginPair,
    pub safety: MarginPair,
}

impl Margins {
    /// Evaluate a common set of `common` validators between quorums that
    /// grow to `quorum_a` and `quorum_b` members, out of `union` in total.
    ///
    /// Liveness and safety use the shared union for both sides, so their two
    /// halves are always equal.
    pub fn evaluate(
        quorum_a: usize,
        quorum_b: usize,
        union: usize,
        common: usize,
        failure: usize,
    ) -> Self {
        let liveness = liveness_margin(union, common, failure);
        let safety = safety_margin(union, common, failure);
        Self {
            min_size: MarginPair::new(
                min_size_margin(quorum_a, failure),
                min_size_margin(quorum_b, failure),
            ),
            liveness: MarginPair::new(liveness, liveness),
            safety: MarginPair::new(safety, safety),
        }
    }

    /// Every check passes.
    pub const fn holds(&self) -> bool {
        self.min_size.holds() && self.liveness.holds() && self.safety.holds()
    }
}
