use std::io::{BufRead, Write};

use super::error::ReviewResult;
use super::session::Reviewer;
use super::types::{HumanLabel, ReviewAction, ReviewerConfidence};
use crate::screening::ScreeningDecision;

/// Abstract characters shown before "v" is needed for the rest.
pub const ABSTRACT_PREVIEW_CHARS: usize = 500;
pub const MAX_QUOTES_SHOWN: usize = 5;

/// Line-oriented reviewer over any input/output pair.
///
/// End of input counts as quit, so a session piped from a file stops cleanly.
pub struct ConsoleReviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// `None` on end of input.
    fn prompt(&mut self, text: &str) -> ReviewResult<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn show(&mut self, decision: &ScreeningDecision, position: usize, queue_len: usize) -> ReviewResult<()> {
        let record = &decision.record;
        let out = &mut self.output;

        writeln!(out)?;
        writeln!(out, "=== Paper {position} of {queue_len} ===")?;
        writeln!(out, "Title:   {}", record.title)?;
        writeln!(out, "Authors: {}", record.authors.as_deref().unwrap_or("unknown"))?;
        match record.year {
            Some(year) => writeln!(out, "Year:    {year}")?,
            None => writeln!(out, "Year:    unknown")?,
        }
        writeln!(out, "ID:      {}", record.display_identifier())?;
        writeln!(out)?;
        writeln!(out, "Abstract:")?;
        writeln!(out, "{}", preview(record.abstract_str(), ABSTRACT_PREVIEW_CHARS))?;
        writeln!(out)?;

        if let Some(score) = &decision.score {
            let s = &score.scores;
            writeln!(
                out,
                "Scores: domain {} | intervention {} | method {} | outcome {} | exclusion {} | title bonus {}",
                s.domain, s.intervention, s.method, s.outcome, s.exclusion, s.title_bonus
            )?;
            writeln!(out, "Total:  {} ({})", s.total(), decision.zone)?;
            if decision.downgraded {
                writeln!(out, "Note:   moved to review because evidence could not be verified")?;
            }
        } else {
            writeln!(out, "Zone:   {}", decision.zone)?;
        }

        let reasoning = decision.reasoning();
        if !reasoning.is_empty() {
            writeln!(out, "Reasoning: {reasoning}")?;
        }

        if let Some(score) = &decision.score
            && !score.evidence_quotes.is_empty()
        {
            writeln!(out, "Evidence:")?;
            for quote in score.evidence_quotes.iter().take(MAX_QUOTES_SHOWN) {
                let mark = if score.unverified_quotes.contains(quote) { " (unverified)" } else { "" };
                writeln!(out, "  - \"{quote}\"{mark}")?;
            }
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Reviewer for ConsoleReviewer<R, W> {
    fn review(
        &mut self,
        decision: &ScreeningDecision,
        position: usize,
        queue_len: usize,
    ) -> ReviewResult<ReviewAction> {
        self.show(decision, position, queue_len)?;

        let label = loop {
            let Some(choice) =
                self.prompt("\n[i]nclude  [e]xclude  [s]kip  [v]iew full abstract  [q]uit: ")?
            else {
                return Ok(ReviewAction::Quit);
            };
            match choice.to_lowercase().as_str() {
                "i" | "include" => break HumanLabel::Include,
                "e" | "exclude" => break HumanLabel::Exclude,
                "s" | "skip" => return Ok(ReviewAction::Skip),
                "q" | "quit" => return Ok(ReviewAction::Quit),
                "v" | "view" => {
                    writeln!(self.output, "\n{}", decision.record.abstract_str())?;
                }
                other => writeln!(self.output, "Unrecognized choice '{other}'")?,
            }
        };

        let reasoning = self.prompt("Reasoning (optional): ")?.unwrap_or_default();

        let confidence = loop {
            let Some(choice) = self.prompt("Confidence [1] low [2] medium [3] high (default 2): ")?
            else {
                break ReviewerConfidence::default();
            };
            if choice.is_empty() {
                break ReviewerConfidence::default();
            }
            match ReviewerConfidence::parse(&choice) {
                Some(confidence) => break confidence,
                None => writeln!(self.output, "Enter 1, 2 or 3")?,
            }
        };

        Ok(ReviewAction::Decide {
            label,
            reasoning,
            confidence,
        })
    }
}

/// First `max_chars` characters, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "(no abstract)".to_string();
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
