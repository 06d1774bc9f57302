//! Agreement between oracle zones and human decisions.
//!
//! Each paired record is reduced to include/exclude (only auto-include counts
//! as include) and scored with Cohen's Kappa, precision, recall and F1, with
//! the human as ground truth. The report is always regenerable from the two
//! inputs.

pub mod agreement;
pub mod error;
mod report;
pub mod sample;
pub mod types;


pub use agreement::{ai_label, recommend, validate};
pub use error::{ValidationError, ValidationResult};
pub use sample::stratified_sample;
pub use types::{
    AgreementReport, ConfusionMatrix, Disagreement, DisagreementDirection, KappaBand, Recommendation,
};
