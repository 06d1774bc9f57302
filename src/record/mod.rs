//! Candidate records, stable record identity and candidate-file loading.

pub mod error;
pub mod loader;
pub mod types;


pub use error::{RecordError, RecordResult};
pub use loader::{load_candidates, parse_candidates_csv};
pub use types::{CandidateRecord, RecordKey, normalize_arxiv_id, normalize_doi};
