//! State module for tracking a single crawl run
//!
//! Every structure here is owned by one run and discarded when it finishes;
//! nothing is process-wide, so independent runs can proceed side by side.
//!
//! # Components
//!
//! - `RunPhase`: Lifecycle of a run (idle, seeding, running per depth, draining, done)
//! - `VisitedSet`: Exactly-once admission of normalized URLs
//! - `DomainState`: Per-domain request history used for rate limiting

mod domain_state;
mod run_phase;
mod visited;

// Re-export main types
pub use domain_state::DomainState;
pub use run_phase::{InvalidTransition, RunPhase};
pub use visited::VisitedSet;
