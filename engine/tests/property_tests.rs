//! Property-based tests for the content fingerprint and the tokenizer

use proptest::prelude::*;

use lecturebot_engine::ingest::fingerprint;
use lecturebot_engine::retrieval::tokenize;

proptest! {
    /// Hashing the same buffer twice yields the same digest
    #[test]
    fn prop_fingerprint_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert_eq!(fingerprint(&bytes), fingerprint(&bytes));
    }

    /// Two buffers differing in even one byte yield different digests
    #[test]
    fn prop_fingerprint_differs_on_flipped_byte(
        bytes in proptest::collection::vec(any::<u8>(), 1..2048),
        index in any::<prop::sample::Index>(),
    ) {
        let i = index.index(bytes.len());
        let mut flipped = bytes.clone();
        flipped[i] ^= 0xFF;
        prop_assert_ne!(fingerprint(&bytes), fingerprint(&flipped));
    }

    /// The digest is always 64 lowercase hex characters
    #[test]
    fn prop_fingerprint_is_hex256(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let digest = fingerprint(&bytes);
        prop_assert_eq!(digest.len(), 64);
        prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Tokens are non-empty, lowercase, and contain no separators
    #[test]
    fn prop_tokens_are_normalized(text in ".{0,200}") {
        for token in tokenize(&text) {
            prop_assert!(!token.is_empty());
            prop_assert!(token.chars().all(|c| c.is_alphanumeric()));
            prop_assert_eq!(token.to_lowercase(), token.clone());
        }
    }

    /// Tokenization is insensitive to the separator used
    #[test]
    fn prop_tokenize_separator_insensitive(words in proptest::collection::vec("[a-z0-9]{1,8}", 1..8)) {
        let spaced = words.join(" ");
        let dashed = words.join("--");
        prop_assert_eq!(tokenize(&spaced), tokenize(&dashed));
    }

    /// Tokenizing the joined tokens reproduces the tokens (stability)
    #[test]
    fn prop_tokenize_is_stable(text in ".{0,200}") {
        let tokens = tokenize(&text);
        let rejoined = tokens.join(" ");
        prop_assert_eq!(tokenize(&rejoined), tokens);
    }
}
