use dayclip_core::models::clamp_percent;

/// Overall progress of one run: clamped to `[0, 100]` and never decreasing.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProgressTracker {
    current: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `target` unless that would go backwards; returns the value to emit.
    pub fn advance(&mut self, target: f64) -> f64 {
        let target = clamp_percent(target);
        if target > self.current {
            self.current = target;
        }
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}
