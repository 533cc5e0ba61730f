// Speech synthesis layer

pub mod google;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::types::SynthesisError;

/// Narrow seam over the external text-to-speech service: answer text in,
/// encoded audio bytes out.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// Content hash identifying the answer a cached audio buffer belongs to.
pub fn audio_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_hash_is_deterministic() {
        assert_eq!(audio_hash("same answer"), audio_hash("same answer"));
    }

    #[test]
    fn test_audio_hash_distinguishes_answers() {
        assert_ne!(audio_hash("first"), audio_hash("second"));
    }

    #[test]
    fn test_audio_hash_is_hex_sha256() {
        assert_eq!(
            audio_hash("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
