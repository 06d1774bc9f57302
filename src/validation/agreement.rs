use std::collections::HashMap;

use tracing::{info, warn};

use super::error::{ValidationError, ValidationResult};
use super::types::{
    AgreementReport, ConfusionMatrix, Disagreement, DisagreementDirection, KappaBand, Recommendation,
};
use crate::constants::{DISAGREEMENT_IMBALANCE_RATIO, RUBRIC_REVIEW_KAPPA};
use crate::record::RecordKey;
use crate::review::{HumanDecision, HumanLabel};
use crate::screening::{ScreeningDecision, Zone};

/// Binary label for a zone. Only auto-include counts as include; error-zone
/// records have no label.
pub fn ai_label(zone: Zone) -> Option<HumanLabel> {
    match zone {
        Zone::AutoInclude => Some(HumanLabel::Include),
        Zone::AutoExclude | Zone::HumanReview => Some(HumanLabel::Exclude),
        Zone::Error => None,
    }
}

/// Compares screening zones with human decisions on the records present in
/// both, in the order of `human_decisions`.
pub fn validate(
    zone_assignments: &[ScreeningDecision],
    human_decisions: &[HumanDecision],
) -> ValidationResult<AgreementReport> {
    let by_key: HashMap<&RecordKey, &ScreeningDecision> =
        zone_assignments.iter().map(|d| (&d.key, d)).collect();

    let mut matrix = ConfusionMatrix::default();
    let mut disagreements = Vec::new();
    let mut unmatched_human = 0;
    let mut skipped_error_zone = 0;

    for human in human_decisions {
        let Some(screening) = by_key.get(&human.key) else {
            unmatched_human += 1;
            continue;
        };
        let Some(ai) = ai_label(screening.zone) else {
            skipped_error_zone += 1;
            continue;
        };

        matrix.add(ai, human.label);
        if ai != human.label {
            let direction = match ai {
                HumanLabel::Include => DisagreementDirection::OverInclusive,
                HumanLabel::Exclude => DisagreementDirection::OverExclusive,
            };
            disagreements.push(Disagreement {
                key: human.key.clone(),
                title: screening.record.title.clone(),
                ai_zone: screening.zone,
                ai_total: screening.total(),
                human_label: human.label,
                human_reasoning: human.reasoning.clone(),
                direction,
            });
        }
    }

    if matrix.total() == 0 {
        return Err(ValidationError::NoOverlap {
            screened: zone_assignments.len(),
            reviewed: human_decisions.len(),
        });
    }
    if unmatched_human > 0 {
        warn!(unmatched_human, "Human decisions without a screening decision were ignored");
    }
    if skipped_error_zone > 0 {
        warn!(skipped_error_zone, "Human decisions on error-zone records were ignored");
    }

    let kappa = matrix.kappa();
    let over_inclusive = matrix.false_positive;
    let over_exclusive = matrix.false_negative;

    let report = AgreementReport {
        compared: matrix.total(),
        unmatched_human,
        skipped_error_zone,
        matrix,
        observed_agreement: matrix.observed_agreement(),
        expected_agreement: matrix.expected_agreement(),
        kappa,
        band: KappaBand::from_kappa(kappa),
        precision: matrix.precision(),
        recall: matrix.recall(),
        f1: matrix.f1(),
        over_inclusive,
        over_exclusive,
        recommendations: recommend(kappa, over_inclusive, over_exclusive),
        disagreements,
    };

    info!(
        compared = report.compared,
        kappa = report.kappa,
        band = %report.band,
        over_inclusive,
        over_exclusive,
        "Agreement computed"
    );
    Ok(report)
}

/// Rubric review below the Kappa target, plus a threshold move when one
/// disagreement direction outweighs the other by more than the imbalance
/// ratio.
pub fn recommend(kappa: f64, over_inclusive: usize, over_exclusive: usize) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if kappa < RUBRIC_REVIEW_KAPPA {
        recommendations.push(Recommendation::ReviseRubric { kappa });
    }
    if over_inclusive > DISAGREEMENT_IMBALANCE_RATIO * over_exclusive {
        recommendations.push(Recommendation::RaiseIncludeThreshold {
            over_inclusive,
            over_exclusive,
        });
    } else if over_exclusive > DISAGREEMENT_IMBALANCE_RATIO * over_inclusive {
        recommendations.push(Recommendation::LowerExcludeThreshold {
            over_inclusive,
            over_exclusive,
        });
    }
    if recommendations.is_empty() {
        recommendations.push(Recommendation::KeepThresholds);
    }
    recommendations
}
