//! Human adjudication of ambiguous records.
//!
//! A [`ReviewSession`] walks a queue of screening decisions (the human-review
//! zone, or a validation sample) and asks a [`Reviewer`] for an independent
//! include/exclude judgment on each. Saved decisions go to their own
//! append-only log, so a session can be quit and resumed; a saved decision
//! is never changed.

pub mod console;
pub mod error;
pub mod session;
pub mod types;


pub use console::ConsoleReviewer;
pub use error::{ReviewError, ReviewResult};
pub use session::{ReviewSession, Reviewer, human_review_queue};
pub use types::{
    DEFAULT_REASONING, HumanDecision, HumanLabel, ReviewAction, ReviewSummary, ReviewerConfidence,
};
