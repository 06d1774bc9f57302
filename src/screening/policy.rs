use serde::{Deserialize, Serialize};

use super::error::{ScreeningError, ScreeningResult};
use super::types::Zone;
use crate::constants::{
    LENIENT_EXCLUDE_THRESHOLD, LENIENT_INCLUDE_THRESHOLD, STRICT_EXCLUDE_THRESHOLD,
    STRICT_INCLUDE_THRESHOLD, TOTAL_MAX, TOTAL_MIN,
};

/// Which preset a policy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    /// Publication-grade review. Strict thresholds.
    SystematicReview,
    /// Broad reading list. Lenient thresholds.
    KnowledgeRepository,
    Custom,
}

impl ProjectType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "systematic-review" | "strict" => Some(Self::SystematicReview),
            "knowledge-repository" | "lenient" => Some(Self::KnowledgeRepository),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystematicReview => "systematic-review",
            Self::KnowledgeRepository => "knowledge-repository",
            Self::Custom => "custom",
        }
    }
}

/// Two thresholds that turn a total score into a zone.
///
/// Policies differ only in their numbers; the routing rule is the same for
/// all of them:
///
/// - `total >= include_threshold` is auto-include
/// - `total < exclude_threshold` is auto-exclude
/// - anything between is human review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningPolicy {
    pub project_type: ProjectType,
    pub include_threshold: i32,
    pub exclude_threshold: i32,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl ScreeningPolicy {
    pub fn strict() -> Self {
        Self {
            project_type: ProjectType::SystematicReview,
            include_threshold: STRICT_INCLUDE_THRESHOLD,
            exclude_threshold: STRICT_EXCLUDE_THRESHOLD,
        }
    }

    pub fn lenient() -> Self {
        Self {
            project_type: ProjectType::KnowledgeRepository,
            include_threshold: LENIENT_INCLUDE_THRESHOLD,
            exclude_threshold: LENIENT_EXCLUDE_THRESHOLD,
        }
    }

    /// Custom thresholds, validated.
    pub fn custom(include_threshold: i32, exclude_threshold: i32) -> ScreeningResult<Self> {
        let policy = Self {
            project_type: ProjectType::Custom,
            include_threshold,
            exclude_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn for_project(project_type: ProjectType) -> Self {
        match project_type {
            ProjectType::KnowledgeRepository => Self::lenient(),
            ProjectType::SystematicReview | ProjectType::Custom => Self::strict(),
        }
    }

    pub fn validate(&self) -> ScreeningResult<()> {
        for value in [self.include_threshold, self.exclude_threshold] {
            if !(TOTAL_MIN..=TOTAL_MAX).contains(&value) {
                return Err(ScreeningError::ThresholdOutOfRange {
                    value,
                    min: TOTAL_MIN,
                    max: TOTAL_MAX,
                });
            }
        }
        if self.include_threshold <= self.exclude_threshold {
            return Err(ScreeningError::InvalidThresholds {
                include: self.include_threshold,
                exclude: self.exclude_threshold,
            });
        }
        Ok(())
    }

    /// Zone for a total score, before any evidence downgrade.
    pub fn assign_zone(&self, total: i32) -> Zone {
        if total >= self.include_threshold {
            Zone::AutoInclude
        } else if total < self.exclude_threshold {
            Zone::AutoExclude
        } else {
            Zone::HumanReview
        }
    }
}
