//! Enforcement decision types.

use std::fmt;

use serde::Serialize;

use crate::error::EnforcementRejection;

/// Machine-readable reason for an enforcement decision.
///
/// Callers branch on this code only; the accompanying detail text is
/// diagnostic and may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    SieDisabled,
    SkillNotFound,
    UnsignedWarn,
    UnsignedStrict,
    VerifyFailed,
    Verified,
}

impl ReasonCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SieDisabled => "SIE_DISABLED",
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::UnsignedWarn => "UNSIGNED_WARN",
            Self::UnsignedStrict => "UNSIGNED_STRICT",
            Self::VerifyFailed => "VERIFY_FAILED",
            Self::Verified => "VERIFIED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcementDecision {
    pub allowed: bool,
    pub reason: ReasonCode,
    pub detail: String,
}

impl EnforcementDecision {
    pub fn new(allowed: bool, reason: ReasonCode, detail: impl Into<String>) -> Self {
        Self {
            allowed,
            reason,
            detail: detail.into(),
        }
    }

    /// `Ok(())` when allowed, the rejection otherwise.
    pub fn into_result(self) -> Result<(), EnforcementRejection> {
        if self.allowed {
            Ok(())
        } else {
            Err(EnforcementRejection {
                reason: self.reason,
                detail: self.detail,
            })
        }
    }
}
