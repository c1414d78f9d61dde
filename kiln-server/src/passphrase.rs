use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex SHA-256 of `"{master}:{identifier}:{w1} {w2} {w3}"`, words trimmed
/// and lower-cased.
pub fn digest(master: &str, identifier: &str, words: [&str; 3]) -> String {
    let words = words
        .iter()
        .map(|word| word.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    sha256_hex(&format!("{master}:{identifier}:{words}"))
}

/// Check `words` against a stored digest in constant time.
pub fn verify(master: &str, identifier: &str, words: [&str; 3], stored: &str) -> bool {
    let computed = digest(master, identifier, words);
    let stored = stored.trim().to_ascii_lowercase();
    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_normalised() {
        assert_eq!(
            digest("m", "alice", ["Apple", " banana ", "CHERRY"]),
            digest("m", "alice", ["apple", "banana", "cherry"])
        );
    }

    #[test]
    fn digest_is_bound_to_master_and_identifier() {
        let words = ["a", "b", "c"];
        let base = digest("m", "alice", words);
        assert_ne!(base, digest("other", "alice", words));
        assert_ne!(base, digest("m", "bob", words));
        assert_eq!(base, sha256_hex("m:alice:a b c"));
        assert_eq!(base.len(), 64);
    }

    #[test]
    fn verify_accepts_only_matching_words() {
        let stored = digest("m", "alice", ["a", "b", "c"]);
        assert!(verify("m", "alice", ["A", "B", "C"], &stored));
        assert!(verify("m", "alice", ["a", "b", "c"], &stored.to_uppercase()));
        assert!(!verify("m", "alice", ["a", "b", "d"], &stored));
        assert!(!verify("m", "alice", ["a", "b", "c"], ""));
    }

    #[test]
    fn known_vector() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
