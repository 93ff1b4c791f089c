//! Content policy gate.
//!
//! Applies constraints from a verified instruction envelope to untrusted
//! input. The gate never reads constraints out of the untrusted text itself.

use serde::Serialize;
use sie_core::{Constraints, VerifiedInstructions};
use tracing::{debug, warn};

use crate::patterns::{DisclosureDetector, SubstringDetector};

/// Reason given when a disclosure attempt is blocked.
pub const REJECT_REASON: &str = "Untrusted content attempted prompt/config/tool disclosure or token exfiltration; blocked by signed constraints.";

/// Reason given when the input is allowed through.
pub const ALLOW_REASON: &str = "No disclosure attempt detected (or policy not enabled).";

/// Outcome of screening one piece of untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: String,
    /// The pattern that triggered a rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: ALLOW_REASON.to_string(),
            matched_pattern: None,
        }
    }

    pub fn reject(pattern: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: REJECT_REASON.to_string(),
            matched_pattern: Some(pattern.into()),
        }
    }
}

/// Screens untrusted input against signed constraints.
#[derive(Debug)]
pub struct ContentPolicyGate {
    detector: Box<dyn DisclosureDetector>,
}

impl Default for ContentPolicyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentPolicyGate {
    /// Gate with the built-in substring detector.
    pub fn new() -> Self {
        Self {
            detector: Box::new(SubstringDetector::default()),
        }
    }

    /// Replace the detector.
    pub fn with_detector(mut self, detector: impl DisclosureDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Screen `untrusted` under `constraints`.
    ///
    /// Only `deny_prompt_disclosure = true` triggers detection; every other
    /// constraint is currently advisory.
    pub fn evaluate(
        &self,
        untrusted: &str,
        constraints: &Constraints,
        extra_patterns: &[String],
    ) -> PolicyDecision {
        if !constraints.denies_prompt_disclosure() {
            debug!("prompt disclosure not denied; input allowed");
            return PolicyDecision::allow();
        }
        match self.detector.find_match(untrusted, extra_patterns) {
            Some(pattern) => {
                warn!(%pattern, "untrusted input blocked");
                PolicyDecision::reject(pattern)
            }
            None => PolicyDecision::allow(),
        }
    }

    /// Screen `untrusted` under the constraints of verified instructions.
    pub fn evaluate_verified(
        &self,
        instructions: &VerifiedInstructions,
        untrusted: &str,
        extra_patterns: &[String],
    ) -> PolicyDecision {
        debug!(
            issuer = %instructions.issuer(),
            envelope_id = %instructions.envelope_id(),
            "screening untrusted input"
        );
        self.evaluate(untrusted, instructions.constraints(), extra_patterns)
    }
}

/// Screen with the default gate.
pub fn evaluate_untrusted_input(
    untrusted: &str,
    constraints: &Constraints,
    extra_patterns: &[String],
) -> PolicyDecision {
    ContentPolicyGate::new().evaluate(untrusted, constraints, extra_patterns)
}
