//! Ordered decision table.
//!
//! The first rule whose predicate matches decides. Facts the table does not
//! cover (an envelope whose verification never ran, say) fall through to a
//! fail-closed `VERIFY_FAILED`.

use crate::config::EnforcementMode;
use crate::decision::{EnforcementDecision, ReasonCode};

/// Result of envelope verification, when it was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verification {
    #[default]
    NotRun,
    Passed,
    Failed(String),
}

/// Everything the table looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionFacts {
    pub enabled: bool,
    pub skill_present: bool,
    pub envelope_present: bool,
    pub mode: EnforcementMode,
    pub verification: Verification,
    /// Skill path as given, for detail text.
    pub skill: String,
}

impl DecisionFacts {
    pub fn new(enabled: bool, mode: EnforcementMode, skill: impl Into<String>) -> Self {
        Self {
            enabled,
            skill_present: false,
            envelope_present: false,
            mode,
            verification: Verification::NotRun,
            skill: skill.into(),
        }
    }
}

/// One row of the decision table.
pub struct Rule {
    pub reason: ReasonCode,
    pub allowed: bool,
    pub predicate: fn(&DecisionFacts) -> bool,
}

/// Precedence is the order of this table.
pub const RULES: &[Rule] = &[
    Rule {
        reason: ReasonCode::SieDisabled,
        allowed: true,
        predicate: |f| !f.enabled,
    },
    Rule {
        reason: ReasonCode::SkillNotFound,
        allowed: false,
        predicate: |f| !f.skill_present,
    },
    Rule {
        reason: ReasonCode::UnsignedWarn,
        allowed: true,
        predicate: |f| !f.envelope_present && f.mode == EnforcementMode::Warn,
    },
    Rule {
        reason: ReasonCode::UnsignedStrict,
        allowed: false,
        predicate: |f| !f.envelope_present && f.mode == EnforcementMode::Strict,
    },
    Rule {
        reason: ReasonCode::VerifyFailed,
        allowed: false,
        predicate: |f| matches!(f.verification, Verification::Failed(_)),
    },
    Rule {
        reason: ReasonCode::Verified,
        allowed: true,
        predicate: |f| f.verification == Verification::Passed,
    },
];

/// Apply [`RULES`] to `facts`.
pub fn decide(facts: &DecisionFacts) -> EnforcementDecision {
    RULES
        .iter()
        .find(|rule| (rule.predicate)(facts))
        .map(|rule| EnforcementDecision::new(rule.allowed, rule.reason, detail(rule.reason, facts)))
        .unwrap_or_else(|| {
            EnforcementDecision::new(
                false,
                ReasonCode::VerifyFailed,
                "no decision rule matched; failing closed",
            )
        })
}

fn detail(reason: ReasonCode, facts: &DecisionFacts) -> String {
    match reason {
        ReasonCode::SieDisabled => "SIE enforcement disabled".to_string(),
        ReasonCode::SkillNotFound => format!("skill file not found: {}", facts.skill),
        ReasonCode::UnsignedWarn => "unsigned skill allowed (warn mode)".to_string(),
        ReasonCode::UnsignedStrict => "unsigned skill rejected (strict mode)".to_string(),
        ReasonCode::VerifyFailed => match &facts.verification {
            Verification::Failed(msg) => format!("signed skill verify failed: {}", msg),
            _ => "signed skill verify failed".to_string(),
        },
        ReasonCode::Verified => "signed skill verified".to_string(),
    }
}
