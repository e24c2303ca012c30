//! Counter milestone detection.
//!
//! A milestone is a positive multiple of 1000. Moving the counter upward past
//! one announces it, once per session.

/// Distance between milestones
pub const MILESTONE_STEP: i64 = 1000;

/// Remembers the highest milestone announced this session
///
/// Never persisted and never reset by the counter: after `Reset` the counter
/// has to climb above the last announced milestone before the next one fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MilestoneTracker {
    last_announced: Option<i64>,
}

impl MilestoneTracker {
    /// Highest milestone announced so far
    #[must_use]
    pub const fn last_announced(&self) -> Option<i64> {
        self.last_announced
    }

    /// Check a counter transition from `previous` to `current`
    ///
    /// Returns the milestone to announce, if any: the highest multiple of
    /// [`MILESTONE_STEP`] in `previous < m <= current` that is above every
    /// milestone announced before. Downward moves never announce.
    pub fn observe(&mut self, previous: i64, current: i64) -> Option<i64> {
        if current <= previous {
            return None;
        }

        let highest = current.div_euclid(MILESTONE_STEP).saturating_mul(MILESTONE_STEP);
        if highest < MILESTONE_STEP || highest <= previous {
            return None;
        }
        if self.last_announced.is_some_and(|last| highest <= last) {
            return None;
        }

        self.last_announced = Some(highest);
        Some(highest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn climb(tracker: &mut MilestoneTracker, from: i64, to: i64) -> Vec<i64> {
        (from..to)
            .filter_map(|value| tracker.observe(value, value + 1))
            .collect()
    }

    #[test]
    fn fires_once_at_one_thousand() {
        let mut tracker = MilestoneTracker::default();
        assert_eq!(climb(&mut tracker, 990, 1000), [1000]);
        assert_eq!(climb(&mut tracker, 1000, 1999), Vec::<i64>::new());
        assert_eq!(climb(&mut tracker, 1999, 2000), [2000]);
    }

    #[test]
    fn decrement_across_a_milestone_is_silent() {
        let mut tracker = MilestoneTracker::default();
        assert_eq!(tracker.observe(1001, 999), None);
        assert_eq!(tracker.last_announced(), None);
    }

    #[test]
    fn does_not_re_announce_after_dropping_back() {
        let mut tracker = MilestoneTracker::default();
        assert_eq!(tracker.observe(999, 1000), Some(1000));
        assert_eq!(tracker.observe(1000, 999), None);
        assert_eq!(tracker.observe(999, 1000), None);
        // Counter reset does not reset the tracker.
        assert_eq!(tracker.observe(0, 1000), None);
    }

    #[test]
    fn large_jump_announces_highest_milestone_only() {
        let mut tracker = MilestoneTracker::default();
        assert_eq!(tracker.observe(10, 3500), Some(3000));
        assert_eq!(tracker.observe(3500, 3999), None);
        assert_eq!(tracker.observe(3999, 4000), Some(4000));
    }

    #[test]
    fn non_positive_values_never_announce() {
        let mut tracker = MilestoneTracker::default();
        assert_eq!(tracker.observe(-3000, -1000), None);
        assert_eq!(tracker.observe(-1, 0), None);
        assert_eq!(tracker.observe(i64::MAX - 1, i64::MAX), None);
        assert_eq!(tracker.observe(i64::MAX - 1000, i64::MAX), Some(i64::MAX / 1000 * 1000));
    }

    proptest! {
        #[test]
        fn each_milestone_fires_at_most_once(steps in prop::collection::vec(-1500i64..1500, 1..60)) {
            let mut tracker = MilestoneTracker::default();
            let mut value = 0i64;
            let mut announced = Vec::new();

            for step in steps {
                let next = value + step;
                if let Some(milestone) = tracker.observe(value, next) {
                    prop_assert!(milestone > value && milestone <= next);
                    prop_assert_eq!(milestone % MILESTONE_STEP, 0);
                    announced.push(milestone);
                }
                value = next;
            }

            prop_assert!(announced.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
