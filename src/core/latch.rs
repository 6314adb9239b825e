//! One-shot latch guarding terminal session resolution.

/// Records the first value claimed and rejects every later claim.
///
/// Several independently scheduled detectors (strike intervals, the skill
/// timer, the physics loop, the countdown) can observe the same lethal state
/// in one instant. All of them funnel through [`ResolutionLatch::claim`]; only
/// the first caller proceeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionLatch<T> {
    claimed: Option<T>,
}

impl<T: Copy> ResolutionLatch<T> {
    pub fn new() -> Self {
        Self { claimed: None }
    }

    /// Returns true if this call won the latch.
    pub fn claim(&mut self, value: T) -> bool {
        if self.claimed.is_some() {
            return false;
        }
        self.claimed = Some(value);
        true
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.is_some()
    }

    pub fn get(&self) -> Option<T> {
        self.claimed
    }
}
