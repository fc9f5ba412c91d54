//! The controller's two periodic activities, run on a virtual clock.
//!
//! The host loop hands over whatever wall time passed since the last frame
//! and the schedule replays each interval expiry inside it in order, so the
//! physics tick keeps its fixed step regardless of frame pacing.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Tick,
    Spawn,
}

/// A repeating timer that can be cancelled and re-armed.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    until_due: Duration,
    armed: bool,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            until_due: period,
            armed: false,
        }
    }

    /// Starts a fresh period; any partially elapsed one is discarded.
    pub fn arm(&mut self) {
        self.until_due = self.period;
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    fn due_in(&self) -> Option<Duration> {
        self.armed.then_some(self.until_due)
    }

    fn elapse(&mut self, dt: Duration) {
        if self.armed {
            self.until_due = self.until_due.saturating_sub(dt);
        }
    }

    fn fire(&mut self) {
        self.until_due = self.period;
    }
}

#[derive(Debug, Clone)]
pub struct Schedule {
    tick: Interval,
    spawn: Interval,
}

impl Schedule {
    pub fn new(tick_period: Duration, spawn_period: Duration) -> Self {
        Self {
            tick: Interval::new(tick_period),
            spawn: Interval::new(spawn_period),
        }
    }

    pub fn arm_all(&mut self) {
        self.tick.arm();
        self.spawn.arm();
    }

    pub fn cancel_all(&mut self) {
        self.tick.cancel();
        self.spawn.cancel();
    }

    pub fn is_armed(&self, activity: Activity) -> bool {
        match activity {
            Activity::Tick => self.tick.is_armed(),
            Activity::Spawn => self.spawn.is_armed(),
        }
    }

    /// Pops the next activity due within `budget`, charging the time up to it
    /// against the budget. Returns `None` once nothing else is due, after
    /// letting the remaining budget run down on the armed intervals.
    pub fn next_due(&mut self, budget: &mut Duration) -> Option<Activity> {
        // Ties go to the physics tick.
        let next = match (self.tick.due_in(), self.spawn.due_in()) {
            (Some(t), Some(s)) if s < t => Some((Activity::Spawn, s)),
            (Some(t), _) => Some((Activity::Tick, t)),
            (None, Some(s)) => Some((Activity::Spawn, s)),
            (None, None) => None,
        };

        match next {
            Some((activity, due)) if due <= *budget => {
                *budget -= due;
                self.tick.elapse(due);
                self.spawn.elapse(due);
                match activity {
                    Activity::Tick => self.tick.fire(),
                    Activity::Spawn => self.spawn.fire(),
                }
                Some(activity)
            }
            _ => {
                self.tick.elapse(*budget);
                self.spawn.elapse(*budget);
                *budget = Duration::ZERO;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(schedule: &mut Schedule, mut budget: Duration) -> Vec<Activity> {
        let mut fired = Vec::new();
        while let Some(a) = schedule.next_due(&mut budget) {
            fired.push(a);
        }
        fired
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unarmed_schedule_never_fires() {
        let mut s = Schedule::new(ms(20), ms(2000));
        assert!(drain(&mut s, ms(10_000)).is_empty());
    }

    #[test]
    fn test_tick_count_matches_elapsed_time() {
        let mut s = Schedule::new(ms(20), ms(2000));
        s.arm_all();
        let fired = drain(&mut s, ms(100));
        assert_eq!(fired, vec![Activity::Tick; 5]);
    }

    #[test]
    fn test_partial_periods_carry_over() {
        let mut s = Schedule::new(ms(20), ms(2000));
        s.arm_all();
        assert!(drain(&mut s, ms(15)).is_empty());
        assert_eq!(drain(&mut s, ms(5)), vec![Activity::Tick]);
        assert_eq!(drain(&mut s, ms(39)), vec![Activity::Tick]);
        assert_eq!(drain(&mut s, ms(1)), vec![Activity::Tick]);
    }

    #[test]
    fn test_spawn_interleaves_in_time_order() {
        let mut s = Schedule::new(ms(20), ms(50));
        s.arm_all();
        let fired = drain(&mut s, ms(100));
        assert_eq!(
            fired,
            vec![
                Activity::Tick,  // 20
                Activity::Tick,  // 40
                Activity::Spawn, // 50
                Activity::Tick,  // 60
                Activity::Tick,  // 80
                Activity::Tick,  // 100
                Activity::Spawn, // 100
            ]
        );
    }

    #[test]
    fn test_spawner_period() {
        let mut s = Schedule::new(ms(20), ms(2000));
        s.arm_all();
        let fired = drain(&mut s, ms(6000));
        assert_eq!(fired.iter().filter(|a| **a == Activity::Spawn).count(), 3);
        assert_eq!(fired.iter().filter(|a| **a == Activity::Tick).count(), 300);
    }

    #[test]
    fn test_cancelled_intervals_stay_quiet() {
        let mut s = Schedule::new(ms(20), ms(2000));
        s.arm_all();
        let mut budget = ms(1000);
        assert_eq!(s.next_due(&mut budget), Some(Activity::Tick));
        s.cancel_all();
        assert_eq!(s.next_due(&mut budget), None);
        assert_eq!(budget, Duration::ZERO);
        assert!(!s.is_armed(Activity::Tick));
        assert!(!s.is_armed(Activity::Spawn));
    }

    #[test]
    fn test_rearm_restarts_period() {
        let mut s = Schedule::new(ms(20), ms(2000));
        s.arm_all();
        assert!(drain(&mut s, ms(1990)).iter().all(|a| *a == Activity::Tick));
        s.arm_all();
        let fired = drain(&mut s, ms(1990));
        assert!(!fired.contains(&Activity::Spawn));
        assert_eq!(drain(&mut s, ms(10)).last(), Some(&Activity::Spawn));
    }
}
