//! Fibonacci-seeded review intervals.
//!
//! Bins 1 and 2 both wait `interval_start` hours; every later bin waits the
//! sum of the two bins below it.

/// Hours to wait before an item in `bin` is due again.
///
/// Bins below 1 are treated as bin 1. Growth saturates instead of
/// overflowing.
pub fn interval_hours(bin: i32, interval_start_hours: i32) -> i64 {
    let start = i64::from(interval_start_hours);
    let (mut previous, mut current) = (start, start);
    for _ in 2..bin {
        let next = previous.saturating_add(current);
        previous = current;
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_sequence() {
        let hours: Vec<i64> = (1..=7).map(|bin| interval_hours(bin, 23)).collect();
        assert_eq!(hours, vec![23, 23, 46, 69, 115, 184, 299]);
    }

    #[test]
    fn first_two_bins_use_the_start_interval() {
        for start in 1..=24 {
            assert_eq!(interval_hours(1, start), i64::from(start));
            assert_eq!(interval_hours(2, start), i64::from(start));
        }
    }

    #[test]
    fn follows_the_fibonacci_recurrence() {
        for start in [1, 5, 12, 24] {
            for bin in 3..=20 {
                assert_eq!(
                    interval_hours(bin, start),
                    interval_hours(bin - 1, start) + interval_hours(bin - 2, start)
                );
            }
        }
    }

    #[test]
    fn uninitialized_bin_behaves_like_bin_one() {
        assert_eq!(interval_hours(0, 6), 6);
    }

    #[test]
    fn saturates_for_huge_bins() {
        assert_eq!(interval_hours(500, 24), i64::MAX);
    }
}
