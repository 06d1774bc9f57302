//! Rubric text sent to the oracle.
//!
//! The static part (rubric + research question) is identical for every record
//! of a run so the oracle side can cache it. Only the user message varies.

use crate::hashing::hash_to_u64;

const RUBRIC: &str = r#"You screen papers for a systematic literature review. Score the paper
against the research question using six dimensions. Use only the title and
abstract. Do not infer facts that are not stated.

1. domain (0-10): does the paper address the population or setting of the
   research question? 10 = directly, 7-9 = strong overlap, 4-6 = mentioned but
   not central, 1-3 = tangential, 0 = unrelated.
2. intervention (0-10): is the intervention, technology or tool of the
   research question studied? 10 = primary focus, 0 = absent.
3. method (0-5): study design rigor. 5 = randomized controlled trial,
   4 = quasi-experimental or pre/post, 3 = mixed methods or quantitative survey,
   2 = qualitative, 1 = descriptive, 0 = no empirical method.
4. outcomes (0-10): are outcomes measured and reported? 10 = explicit and
   rigorously measured, 0 = none.
5. exclusion (-20 to 0): penalties. -20 unrelated field, -15 wrong population,
   -10 review or meta-analysis, -10 editorial or commentary, -5 abstract only.
   Penalties stack and are capped at -20.
6. title_bonus (0 or 10): 10 only if both the domain and the intervention
   appear in the title.

Every evidence quote must be copied verbatim from the abstract. If there is no
evidence for a dimension, score it 0.

Answer with JSON only:
{
  "scores": {"domain": 0, "intervention": 0, "method": 0, "outcomes": 0,
             "exclusion": 0, "title_bonus": 0},
  "total_score": 0,
  "confidence": 0,
  "reasoning": "two or three sentences",
  "evidence_quotes": ["verbatim quote from the abstract"]
}"#;

/// Static rubric plus research question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningPrompt {
    research_question: String,
    system: String,
}

impl ScreeningPrompt {
    pub fn new(research_question: impl Into<String>) -> Self {
        let research_question = research_question.into();
        let system = format!("{RUBRIC}\n\nResearch question: {}", research_question.trim());
        Self {
            research_question,
            system,
        }
    }

    pub fn research_question(&self) -> &str {
        &self.research_question
    }

    /// Cacheable system block.
    pub fn system_text(&self) -> &str {
        &self.system
    }

    /// Per-record message.
    pub fn user_text(&self, title: &str, abstract_text: &str) -> String {
        format!("Title: {}\n\nAbstract: {}", title.trim(), abstract_text.trim())
    }

    /// Short fingerprint of the static block, for logs and progress headers.
    pub fn fingerprint(&self) -> String {
        format!("{:016x}", hash_to_u64(self.system.as_bytes()))
    }
}
