//! Synthetic recognition progress
//!
//! The engine reports no real progress, so the indicator is driven by a timer:
//! fixed steps up to a cap, then a jump to 100 when the text arrives.

/// Timer-driven progress counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticProgress {
    percent: u8,
    step: u8,
    cap: u8,
}

impl SyntheticProgress {
    pub fn new(step: u8, cap: u8) -> Self {
        Self {
            percent: 0,
            step: step.max(1),
            cap: cap.min(100),
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Advance one tick. Returns the new value, or `None` once the cap is reached.
    pub fn advance(&mut self) -> Option<u8> {
        if self.percent >= self.cap {
            return None;
        }
        self.percent = self.percent.saturating_add(self.step).min(self.cap);
        Some(self.percent)
    }

    /// Result arrived
    pub fn complete(&mut self) -> u8 {
        self.percent = 100;
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_to_cap_then_stops() {
        let mut progress = SyntheticProgress::new(10, 90);
        let ticks: Vec<u8> = std::iter::from_fn(|| progress.advance()).collect();

        assert_eq!(ticks, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
        assert_eq!(progress.advance(), None);
        assert_eq!(progress.percent(), 90);
    }

    #[test]
    fn test_uneven_step_is_clamped_to_cap() {
        let mut progress = SyntheticProgress::new(40, 90);
        assert_eq!(progress.advance(), Some(40));
        assert_eq!(progress.advance(), Some(80));
        assert_eq!(progress.advance(), Some(90));
        assert_eq!(progress.advance(), None);
    }

    #[test]
    fn test_complete_jumps_to_100() {
        let mut progress = SyntheticProgress::new(10, 90);
        progress.advance();
        assert_eq!(progress.complete(), 100);
    }

    #[test]
    fn test_degenerate_settings() {
        let mut zero_step = SyntheticProgress::new(0, 3);
        assert_eq!(zero_step.advance(), Some(1));

        let mut over_cap = SyntheticProgress::new(250, 255);
        assert_eq!(over_cap.advance(), Some(100));
        assert_eq!(over_cap.advance(), None);
    }
}
