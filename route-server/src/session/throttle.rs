//! Rate limiting for tentative resolves while a marker is dragged.
//!
//! Time is split into fixed windows of `period` counted from the throttle's
//! epoch. At most one drag update is admitted per window; the first update
//! in a fresh window is always admitted.

use std::time::{Duration, Instant};

/// Fixed-period drag throttle owned by one session.
#[derive(Debug, Clone)]
pub struct DragThrottle {
    epoch: Instant,
    period: Duration,
    last_window: Option<u128>,
}

impl DragThrottle {
    /// Create a throttle whose windows start now.
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    /// Create a throttle whose windows start at `epoch`.
    pub fn starting_at(epoch: Instant, period: Duration) -> Self {
        Self {
            epoch,
            period,
            last_window: None,
        }
    }

    /// Admit or drop an update arriving at `now`.
    ///
    /// A zero period admits everything.
    pub fn admit_at(&mut self, now: Instant) -> bool {
        if self.period.is_zero() {
            return true;
        }

        let window = now.saturating_duration_since(self.epoch).as_nanos() / self.period.as_nanos();
        if self.last_window == Some(window) {
            return false;
        }

        self.last_window = Some(window);
        true
    }

    /// Admit or drop an update arriving now.
    pub fn admit(&mut self) -> bool {
        self.admit_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(30);

    #[test]
    fn one_admission_per_window() {
        let epoch = Instant::now();
        let mut throttle = DragThrottle::starting_at(epoch, PERIOD);

        assert!(throttle.admit_at(epoch));
        assert!(!throttle.admit_at(epoch + Duration::from_millis(10)));
        assert!(!throttle.admit_at(epoch + Duration::from_millis(29)));

        assert!(throttle.admit_at(epoch + Duration::from_millis(30)));
        assert!(!throttle.admit_at(epoch + Duration::from_millis(59)));
    }

    #[test]
    fn windows_are_wall_clock_aligned() {
        let epoch = Instant::now();
        let mut throttle = DragThrottle::starting_at(epoch, PERIOD);

        // First admission late in a window does not push the next boundary out.
        assert!(throttle.admit_at(epoch + Duration::from_millis(28)));
        assert!(throttle.admit_at(epoch + Duration::from_millis(31)));
    }

    #[test]
    fn idle_windows_do_not_accumulate() {
        let epoch = Instant::now();
        let mut throttle = DragThrottle::starting_at(epoch, PERIOD);

        assert!(throttle.admit_at(epoch + Duration::from_millis(300)));
        assert!(!throttle.admit_at(epoch + Duration::from_millis(301)));
    }

    #[test]
    fn zero_period_admits_everything() {
        let epoch = Instant::now();
        let mut throttle = DragThrottle::starting_at(epoch, Duration::ZERO);
        assert!(throttle.admit_at(epoch));
        assert!(throttle.admit_at(epoch));
    }

    #[test]
    fn admit_uses_current_time() {
        let mut throttle = DragThrottle::new(Duration::from_secs(3600));
        assert!(throttle.admit());
        assert!(!throttle.admit());
    }
}
