//! Loader flows: gate a skill before trusting its text, or load verified
//! instructions directly from an envelope.

use std::path::Path;

use sie_core::{io, InstructionEnvelope, VerifiedInstructions};

use crate::config::EnforcementConfig;
use crate::engine::admit_skill;
use crate::error::Result;
use crate::trust::IssuerTrust;

/// Return the skill text if enforcement allows it.
///
/// When the content hash was checked, the returned text is the exact text
/// that passed the check; the file is not read again.
///
/// A refusal surfaces as [`crate::EnforcementError::Rejected`] carrying the
/// reason code and detail.
pub fn load_skill_text(
    skill: &Path,
    config: &EnforcementConfig,
    trust: &dyn IssuerTrust,
) -> Result<String> {
    let admission = admit_skill(skill, config, trust);
    admission.decision.into_result()?;
    match admission.checked_text {
        Some(text) => Ok(text),
        None => Ok(io::read_text(&config.resolve_path(skill), "Skill file")?),
    }
}

/// Load, resolve, verify and optionally hash-check an envelope.
///
/// Steps run in order: load the envelope, resolve the issuer key, read the
/// check file, verify the signature, compare the check file digest. The
/// first failure wins, so a tampered envelope reports a bad signature even
/// when the check file also differs.
pub fn load_verified_instructions(
    envelope_path: &Path,
    trust: &dyn IssuerTrust,
    check_file: Option<&Path>,
) -> sie_core::Result<VerifiedInstructions> {
    verify_with_check_text(envelope_path, trust, check_file).map(|(verified, _)| verified)
}

/// [`load_verified_instructions`], also handing back the check file text
/// that matched the digest.
pub(crate) fn verify_with_check_text(
    envelope_path: &Path,
    trust: &dyn IssuerTrust,
    check_file: Option<&Path>,
) -> sie_core::Result<(VerifiedInstructions, Option<String>)> {
    let envelope = InstructionEnvelope::load(envelope_path)?;
    let public_key = trust.issuer_key(envelope.issuer_id()?)?;
    let check_text = check_file
        .map(|path| io::read_text(path, "Check file"))
        .transpose()?;

    let digest = check_text
        .as_deref()
        .map(|text| envelope.check_content_digest(text));
    let verified = envelope.into_verified(public_key)?;
    if let Some(result) = digest {
        result?;
    }
    Ok((verified, check_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ReasonCode;
    use crate::error::EnforcementError;
    use sie_core::{Constraints, KeyPair, SieError, VerificationError};
    use sie_registry::Keyring;

    fn signed(issuer: &KeyPair, content: &str) -> InstructionEnvelope {
        InstructionEnvelope::new(
            "acme",
            vec!["skill:demo".into()],
            Constraints::new().with_deny_prompt_disclosure(true),
            "SKILL.md",
            "text/markdown",
            content,
            None,
        )
        .sign(issuer)
        .unwrap()
    }

    #[test]
    fn verified_instructions_expose_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let issuer = KeyPair::generate();
        let path = dir.path().join("SKILL.md.sie.json");
        signed(&issuer, "do things").save(&path).unwrap();
        let ring = Keyring::new().with_issuer("acme", issuer.public_key_b64());

        let verified = load_verified_instructions(&path, &ring, None).unwrap();
        assert_eq!(verified.issuer(), "acme");
        assert_eq!(verified.content(), "do things");
        assert!(verified.constraints().denies_prompt_disclosure());
    }

    #[test]
    fn tampered_content_is_bad_signature_even_with_check_file() {
        let dir = tempfile::tempdir().unwrap();
        let issuer = KeyPair::generate();
        let path = dir.path().join("SKILL.md.sie.json");
        let check = dir.path().join("SKILL.md");
        std::fs::write(&check, "other text").unwrap();
        let mut env = signed(&issuer, "do things");
        env.payload.content.push_str("\n# tamper\n");
        env.save(&path).unwrap();
        let ring = Keyring::new().with_issuer("acme", issuer.public_key_b64());

        let err = load_verified_instructions(&path, &ring, Some(&check)).unwrap_err();
        assert!(matches!(
            err,
            SieError::Verification(VerificationError::BadSignature)
        ));
    }

    #[test]
    fn missing_check_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let issuer = KeyPair::generate();
        let path = dir.path().join("SKILL.md.sie.json");
        signed(&issuer, "x").save(&path).unwrap();
        let ring = Keyring::new().with_issuer("acme", issuer.public_key_b64());

        let missing = dir.path().join("nope.md");
        let err = load_verified_instructions(&path, &ring, Some(&missing)).unwrap_err();
        assert!(!err.is_verification());
    }

    #[test]
    fn skill_text_is_the_hash_checked_text() {
        let dir = tempfile::tempdir().unwrap();
        let issuer = KeyPair::generate();
        let skill = dir.path().join("SKILL.md");
        std::fs::write(&skill, "do things").unwrap();
        signed(&issuer, "do things")
            .save(&InstructionEnvelope::sibling_path(&skill, ".sie.json"))
            .unwrap();
        let ring = Keyring::new().with_issuer("acme", issuer.public_key_b64());
        let config = EnforcementConfig::enabled().with_strict(true);

        let admission = admit_skill(&skill, &config, &ring);
        assert_eq!(admission.decision.reason, ReasonCode::Verified);
        assert_eq!(admission.checked_text.as_deref(), Some("do things"));
        assert_eq!(load_skill_text(&skill, &config, &ring).unwrap(), "do things");

        let unchecked = config.with_check_content_hash(false);
        assert_eq!(admit_skill(&skill, &unchecked, &ring).checked_text, None);
        assert_eq!(load_skill_text(&skill, &unchecked, &ring).unwrap(), "do things");
    }

    #[test]
    fn rejection_message_names_reason() {
        let dir = tempfile::tempdir().unwrap();
        let skill = dir.path().join("SKILL.md");
        std::fs::write(&skill, "# unsigned\n").unwrap();
        let config = EnforcementConfig::enabled().with_strict(true);

        let err = load_skill_text(&skill, &config, &Keyring::new()).unwrap_err();
        match err {
            EnforcementError::Rejected(rejection) => {
                assert_eq!(rejection.reason, ReasonCode::UnsignedStrict);
                assert!(rejection.to_string().starts_with("skill rejected (UNSIGNED_STRICT)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
