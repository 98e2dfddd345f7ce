//! Content fingerprint: SHA-1 over `title|description|location`.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

const FIELD_DELIMITER: &str = "|";

/// 40-char lowercase hex SHA-1 digest identifying an event's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub fn fingerprint(title: &str, description: &str, location: &str) -> Fingerprint {
    let mut hasher = Sha1::new();
    hasher.update(title.as_bytes());
    hasher.update(FIELD_DELIMITER.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(FIELD_DELIMITER.as_bytes());
    hasher.update(location.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digest() {
        assert_eq!(
            fingerprint("X", "Y happens", "Z").as_str(),
            "fc33c9bd25bfe79117c02b92564a5b22a4027133"
        );
    }

    #[test]
    fn deterministic() {
        let a = fingerprint("The Treaty", "Signed at dawn", "Vienna, Austria");
        let b = fingerprint("The Treaty", "Signed at dawn", "Vienna, Austria");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 40);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn each_field_changes_digest() {
        let base = fingerprint("The Treaty", "Signed at dawn", "Vienna, Austria");
        assert_ne!(base, fingerprint("The Treaty!", "Signed at dawn", "Vienna, Austria"));
        assert_ne!(base, fingerprint("The Treaty", "Signed at dusk", "Vienna, Austria"));
        assert_ne!(base, fingerprint("The Treaty", "Signed at dawn", "Graz, Austria"));
    }

    #[test]
    fn non_ascii_content_hashes_as_utf8() {
        let a = fingerprint("Zürich accord", "Übereinkunft", "Zürich, Schweiz");
        let b = fingerprint("Zurich accord", "Ubereinkunft", "Zurich, Schweiz");
        assert_ne!(a, b);
    }
}
