//! Skill admission.
//!
//! Facts are gathered lazily in rule order: a disabled config touches no
//! files, and verification only runs when an envelope exists.

use std::path::Path;

use sie_core::VerifiedInstructions;
use tracing::{debug, info, warn};

use crate::config::EnforcementConfig;
use crate::decision::{EnforcementDecision, ReasonCode};
use crate::error::Result;
use crate::loader::verify_with_check_text;
use crate::rules::{self, DecisionFacts, Verification};
use crate::trust::{IssuerTrust, TrustMaterial};

/// A decision plus the skill text its content hash was checked against.
pub(crate) struct Admission {
    pub decision: EnforcementDecision,
    pub checked_text: Option<String>,
}

/// Decide whether `skill` may load, using already-loaded trust material.
pub fn evaluate_skill(
    skill: &Path,
    config: &EnforcementConfig,
    trust: &dyn IssuerTrust,
) -> EnforcementDecision {
    admit_skill(skill, config, trust).decision
}

pub(crate) fn admit_skill(
    skill: &Path,
    config: &EnforcementConfig,
    trust: &dyn IssuerTrust,
) -> Admission {
    evaluate_with(skill, config, |envelope, skill_path| {
        verify_skill_envelope(envelope, skill_path, config, trust)
    })
}

/// Decide whether `skill` may load, loading the configured trust source
/// only if an envelope needs verifying.
///
/// A trust source that cannot be loaded fails closed as `VERIFY_FAILED`.
pub fn enforce_skill(skill: &Path, config: &EnforcementConfig) -> EnforcementDecision {
    evaluate_with(skill, config, |envelope, skill_path| {
        let trust = TrustMaterial::from_config(config)?;
        verify_skill_envelope(envelope, skill_path, config, &trust)
    })
    .decision
}

fn verify_skill_envelope(
    envelope: &Path,
    skill_path: &Path,
    config: &EnforcementConfig,
    trust: &dyn IssuerTrust,
) -> Result<(VerifiedInstructions, Option<String>)> {
    let check_file = config.check_content_hash.then_some(skill_path);
    Ok(verify_with_check_text(envelope, trust, check_file)?)
}

fn evaluate_with<F>(skill: &Path, config: &EnforcementConfig, verify: F) -> Admission
where
    F: FnOnce(&Path, &Path) -> Result<(VerifiedInstructions, Option<String>)>,
{
    let mut facts = DecisionFacts::new(config.enabled, config.mode(), skill.display().to_string());
    let mut checked_text = None;

    if facts.enabled {
        let skill_path = config.resolve_path(skill);
        facts.skill_present = skill_path.exists();
        if facts.skill_present {
            let envelope_path = config.envelope_path(&skill_path);
            facts.envelope_present = envelope_path.exists();
            if facts.envelope_present {
                facts.verification = match verify(&envelope_path, &skill_path) {
                    Ok((verified, text)) => {
                        debug!(
                            issuer = %verified.issuer(),
                            envelope_id = %verified.envelope_id(),
                            "skill envelope verified"
                        );
                        checked_text = text;
                        Verification::Passed
                    }
                    Err(err) => Verification::Failed(err.to_string()),
                };
            }
        }
    }

    let decision = rules::decide(&facts);
    match decision.reason {
        ReasonCode::SieDisabled => debug!(skill = %facts.skill, "SIE disabled; skill allowed"),
        ReasonCode::Verified => {
            info!(skill = %facts.skill, reason = %decision.reason, "skill allowed")
        }
        _ if decision.allowed => warn!(
            skill = %facts.skill,
            reason = %decision.reason,
            detail = %decision.detail,
            "skill allowed without verification"
        ),
        _ => warn!(
            skill = %facts.skill,
            reason = %decision.reason,
            detail = %decision.detail,
            "skill rejected"
        ),
    }
    Admission {
        decision,
        checked_text,
    }
}
