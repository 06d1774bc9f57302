use std::fmt::{self, Write};

use super::types::{AgreementReport, DisagreementDirection};

impl AgreementReport {
    /// Human-readable rendering for `kappa_report.md`.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        // writing into a String cannot fail
        let _ = self.render_markdown(&mut md);
        md
    }

    fn render_markdown(&self, md: &mut String) -> fmt::Result {
        let m = &self.matrix;

        writeln!(md, "# Oracle vs Human Agreement\n")?;
        writeln!(md, "Paired records: {}\n", self.compared)?;
        if self.unmatched_human > 0 || self.skipped_error_zone > 0 {
            writeln!(
                md,
                "Ignored: {} human decision(s) without a screening decision, {} on error-zone records\n",
                self.unmatched_human, self.skipped_error_zone
            )?;
        }

        writeln!(md, "## Cohen's Kappa\n")?;
        writeln!(md, "- Kappa: **{:.3}** ({})", self.kappa, self.band)?;
        writeln!(md, "- Observed agreement: {:.1}%", 100.0 * self.observed_agreement)?;
        writeln!(md, "- Chance agreement: {:.1}%\n", 100.0 * self.expected_agreement)?;

        writeln!(md, "## Confusion Matrix (human as ground truth)\n")?;
        writeln!(md, "|                | Human include | Human exclude |")?;
        writeln!(md, "|----------------|---------------|---------------|")?;
        writeln!(md, "| Oracle include | {} | {} |", m.true_positive, m.false_positive)?;
        writeln!(md, "| Oracle exclude | {} | {} |\n", m.false_negative, m.true_negative)?;

        writeln!(md, "- Precision: {:.3}", self.precision)?;
        writeln!(md, "- Recall: {:.3}", self.recall)?;
        writeln!(md, "- F1: {:.3}\n", self.f1)?;

        writeln!(md, "## Disagreements\n")?;
        writeln!(md, "- Over-inclusive (oracle include, human exclude): {}", self.over_inclusive)?;
        writeln!(md, "- Over-exclusive (oracle exclude, human include): {}\n", self.over_exclusive)?;
        for d in &self.disagreements {
            let direction = match d.direction {
                DisagreementDirection::OverInclusive => "over-inclusive",
                DisagreementDirection::OverExclusive => "over-exclusive",
            };
            let total = d.ai_total.map_or_else(|| "n/a".to_string(), |t| t.to_string());
            writeln!(
                md,
                "- [{direction}] {} (zone {}, total {total}; human: {}, \"{}\")",
                d.title, d.ai_zone, d.human_label, d.human_reasoning
            )?;
        }
        if !self.disagreements.is_empty() {
            md.push('\n');
        }

        writeln!(md, "## Recommendations\n")?;
        for recommendation in &self.recommendations {
            writeln!(md, "- {recommendation}")?;
        }
        Ok(())
    }
}
