//! Loop controller.
//!
//! A loop alternates a forward step (assign the target values) with a
//! backward step (restore the values captured before the first step). One
//! forward+backward pair is a cycle.
//!
//! ```text
//! Idle -> RunningForward -> RunningBackward -> RunningForward ... -> Done
//! Idle -> RunningForward -> Locking -> Done          (loop = 0)
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use motion_core::keyframes::{AnimationDirection, IterationCount};

/// How many forward+backward cycles to run.
///
/// `Times(0)` is the single-shot path: play forward once and keep the end
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "count", rename_all = "snake_case")]
pub enum LoopCount {
    Times(u32),
    Infinite,
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::Times(0)
    }
}

impl LoopCount {
    pub fn is_single_shot(&self) -> bool {
        *self == Self::Times(0)
    }

    /// Iteration policy for keyframe playback: one iteration for the
    /// single-shot path, otherwise two alternating iterations per cycle.
    pub fn keyframe_iterations(&self) -> (IterationCount, AnimationDirection) {
        match self {
            Self::Times(0) => (IterationCount::Times(1), AnimationDirection::Alternate),
            Self::Times(n) => (
                IterationCount::Times(n.saturating_mul(2)),
                AnimationDirection::Alternate,
            ),
            Self::Infinite => (IterationCount::Infinite, AnimationDirection::Alternate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    RunningForward,
    RunningBackward,
    /// Assigning the end values with transitions disabled.
    Locking,
    Done,
}

/// Drives the phase sequence of one target's loop.
#[derive(Debug, Clone)]
pub struct LoopController {
    count: LoopCount,
    /// Cycles left, `None` when unbounded.
    remaining: Option<u32>,
    phase: LoopPhase,
}

impl LoopController {
    pub fn new(count: LoopCount) -> Self {
        let remaining = match count {
            LoopCount::Times(n) => Some(n),
            LoopCount::Infinite => None,
        };
        Self {
            count,
            remaining,
            phase: LoopPhase::Idle,
        }
    }

    pub fn count(&self) -> LoopCount {
        self.count
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Cycles still to run; `None` when unbounded.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.phase == LoopPhase::Done
    }

    /// Move to the next phase once the current one completed.
    pub fn advance(&mut self) -> LoopPhase {
        self.phase = match self.phase {
            LoopPhase::Idle => LoopPhase::RunningForward,
            LoopPhase::RunningForward if self.count.is_single_shot() => LoopPhase::Locking,
            LoopPhase::RunningForward => LoopPhase::RunningBackward,
            LoopPhase::RunningBackward => {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(1);
                }
                match self.remaining {
                    Some(0) => LoopPhase::Done,
                    _ => LoopPhase::RunningForward,
                }
            }
            LoopPhase::Locking | LoopPhase::Done => LoopPhase::Done,
        };
        debug!(phase = ?self.phase, remaining = ?self.remaining, "loop phase");
        self.phase
    }

    /// Stop early, e.g. when the target was detached.
    pub fn stop(&mut self) {
        self.phase = LoopPhase::Done;
    }
}
