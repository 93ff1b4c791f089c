//! Instruction channel guard.

use sie_core::{InstructionEnvelope, INSTRUCTION_CHANNEL};

use crate::error::{PolicyError, Result};

/// Reject any envelope not on the instruction channel.
///
/// Constraints are only honored when they arrive through the instruction
/// channel; data-channel content can never carry policy.
pub fn require_instruction_channel(envelope: &InstructionEnvelope) -> Result<()> {
    if envelope.channel != INSTRUCTION_CHANNEL {
        return Err(PolicyError::NotInstructionChannel {
            channel: envelope.channel.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sie_core::Constraints;

    fn envelope(channel: &str) -> InstructionEnvelope {
        let mut env = InstructionEnvelope::new(
            "acme",
            vec![],
            Constraints::new(),
            "SKILL.md",
            "text/markdown",
            "body",
            None,
        );
        env.channel = channel.to_string();
        env
    }

    #[test]
    fn instruction_channel_accepted() {
        assert!(require_instruction_channel(&envelope("instruction")).is_ok());
    }

    #[test]
    fn other_channels_rejected() {
        for channel in ["data", "", "Instruction"] {
            assert!(matches!(
                require_instruction_channel(&envelope(channel)),
                Err(PolicyError::NotInstructionChannel { .. })
            ));
        }
    }
}
