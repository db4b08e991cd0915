use crate::config::schema::{parse_hash, HashAlgorithm, Verify};
use crate::error::PatchError;
use xxhash_rust::xxh3::xxh3_64;

/// Expected content of a block before it is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (for large blocks)
    Hash(u64),
}

impl BlockVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            BlockVerification::ExactMatch(expected) => text == expected,
            BlockVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }
}

impl TryFrom<&Verify> for BlockVerification {
    type Error = PatchError;

    fn try_from(verify: &Verify) -> Result<Self, Self::Error> {
        match verify {
            Verify::ExactMatch { expected_text } => {
                Ok(BlockVerification::ExactMatch(expected_text.clone()))
            }
            // xxh3 is the only algorithm, and the default when none is named
            Verify::Hash {
                algorithm: None | Some(HashAlgorithm::Xxh3),
                expected,
            } => parse_hash(expected)
                .map(BlockVerification::Hash)
                .ok_or_else(|| PatchError::InvalidHash(expected.clone())),
        }
    }
}

/// Hex form accepted by `verify.expected` in a fix plan.
pub fn block_hash_hex(text: &str) -> String {
    format!("{:016x}", xxh3_64(text.as_bytes()))
}
