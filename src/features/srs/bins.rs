//! Leitner bin transitions.

use crate::data::models::ExerciseResult;

/// Bins lost when any exercise in a lesson failed
pub const FAIL_PENALTY: i32 = 2;

/// How one lesson's results for an item move its bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Regress,
    Hold,
    Advance,
}

impl Verdict {
    /// A fail outranks a hint, a hint outranks success.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a ExerciseResult>,
    {
        let mut verdict = Verdict::Advance;
        for result in results {
            match result {
                ExerciseResult::Fail => return Verdict::Regress,
                ExerciseResult::Hint => verdict = Verdict::Hold,
                ExerciseResult::Success => {}
            }
        }
        verdict
    }
}

/// New bin for an item after one lesson.
///
/// A first exposure always lands in bin 1. The result is clamped to
/// `1..=max_bins` so a stale bin (for example after `max_bins` was lowered)
/// never escapes the configured range.
pub fn next_bin(
    current: i32,
    results: &[ExerciseResult],
    first_exposure: bool,
    max_bins: i32,
) -> i32 {
    let max_bins = max_bins.max(1);
    if first_exposure {
        return 1;
    }

    let bin = match Verdict::from_results(results) {
        Verdict::Regress => current - FAIL_PENALTY,
        Verdict::Hold => current,
        Verdict::Advance => current + 1,
    };
    bin.clamp(1, max_bins)
}
