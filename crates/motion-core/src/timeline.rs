//! Delay and duration bookkeeping shared by transitions and keyframe
//! animations.

/// Time fed to one animation so far, measured against its delay and the
/// length of a single pass.
///
/// A negative delay starts the first pass part way through, like CSS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    delay_ms: f32,
    duration_ms: f32,
    elapsed_ms: f32,
}

impl Timeline {
    pub fn new(duration_ms: f32, delay_ms: f32) -> Self {
        Self {
            delay_ms,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
        }
    }

    pub fn tick(&mut self, delta_ms: f32) {
        self.elapsed_ms += delta_ms;
    }

    pub fn is_zero_length(&self) -> bool {
        self.duration_ms <= 0.0
    }

    /// Still inside the delay.
    pub fn waiting(&self) -> bool {
        self.elapsed_ms < self.delay_ms
    }

    /// Passes played since the delay ended, fractional. A zero-length
    /// timeline has played every pass once its delay is over.
    pub fn passes(&self) -> f32 {
        if self.waiting() {
            0.0
        } else if self.is_zero_length() {
            f32::INFINITY
        } else {
            (self.elapsed_ms - self.delay_ms) / self.duration_ms
        }
    }

    /// Index of the pass in progress and the offset within it. Exactly on a
    /// boundary the pass just completed is reported at offset 1.0.
    pub fn position(&self) -> (u32, f32) {
        let passes = self.passes();
        if !passes.is_finite() {
            return (0, 1.0);
        }
        let offset = passes.fract();
        if passes >= 1.0 && offset == 0.0 {
            (passes as u32 - 1, 1.0)
        } else {
            (passes as u32, offset)
        }
    }
}
