//! Checksum calculation for memoization keys.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of a string.
///
/// # Returns
/// Hexadecimal string representation of the hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checksum over several parts, each length-prefixed so that
/// `["ab", "c"]` and `["a", "bc"]` hash differently.
pub fn checksum_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"countries": ["Global"]}"#;
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
        assert_eq!(calculate_checksum(content).len(), 64);
    }

    #[test]
    fn test_different_content_different_checksum() {
        assert_ne!(calculate_checksum("a"), calculate_checksum("b"));
    }

    #[test]
    fn test_parts_are_delimited() {
        assert_ne!(checksum_parts(["ab", "c"]), checksum_parts(["a", "bc"]));
        assert_eq!(checksum_parts(["x", "y"]), checksum_parts(["x", "y"]));
    }
}
