//! Lifecycle of a single crawl run
//!
//! Valid transitions:
//!
//! ```text
//! Idle -> Seeding -> Running(0) -> Running(1) -> ... -> Draining -> Done
//! ```
//!
//! Seeding, Running and Draining may also jump straight to Done when the run
//! is cancelled.
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Created but not started
    Idle,

    /// Validating, filtering and admitting seed URLs
    Seeding,

    /// Processing every task of one depth level
    Running { depth: u32 },

    /// Frontier exhausted or depth limit reached; flushing results
    Draining,

    /// Terminal; no further tasks are admitted
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid run phase transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RunPhase,
    pub to: RunPhase,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the depth currently being processed, if any
    pub fn depth(&self) -> Option<u32> {
        match self {
            Self::Running { depth } => Some(*depth),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        match (*self, next) {
            (Self::Idle, Self::Seeding) => true,
            (Self::Seeding, Self::Running { depth: 0 }) => true,
            (Self::Running { depth }, Self::Running { depth: next_depth }) => {
                next_depth == depth + 1
            }
            (Self::Seeding | Self::Running { .. }, Self::Draining) => true,
            // Cancellation jumps straight to Done from any live phase
            (Self::Seeding | Self::Running { .. } | Self::Draining, Self::Done) => true,
            _ => false,
        }
    }

    /// Moves to `next` if the transition is valid
    pub fn transition(&mut self, next: RunPhase) -> Result<(), InvalidTransition> {
        if self.can_transition_to(next) {
            *self = next;
            Ok(())
        } else {
            Err(InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl Default for RunPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Seeding => write!(f, "seeding"),
            Self::Running { depth } => write!(f, "running(depth={})", depth),
            Self::Draining => write!(f, "draining"),
            Self::Done => write!(f, "done"),
        }
    }
}
