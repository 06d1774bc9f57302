//! Relevance scoring and decision routing.
//!
//! Each record of the unique corpus is scored through the
//! [`OracleAdapter`](crate::oracle::OracleAdapter) and routed to a [`Zone`] by
//! a [`ScreeningPolicy`]. Decisions are appended to a resumable
//! [`ProgressLog`] as they complete and merged by record key, so the final
//! partition does not depend on worker completion order.

pub mod engine;
pub mod error;
pub mod policy;
pub mod progress;
pub mod summary;
pub mod types;


pub use engine::{PartitionedCorpus, ProgressOptions, assign_keys, classify};
pub use error::{ProgressError, ProgressResult, ScreeningError, ScreeningResult};
pub use policy::{ProjectType, ScreeningPolicy};
pub use progress::{Keyed, PROGRESS_VERSION, ProgressLog};
pub use summary::{ScoreStats, ScreeningSummary};
pub use types::{ScreeningDecision, Zone, decide};
