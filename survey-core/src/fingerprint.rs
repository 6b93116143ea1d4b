//! Respondent fingerprints
//!
//! A fingerprint is nothing more than a SHA-256 digest of a few browser
//! properties. It is only used to recognize a returning respondent on the
//! same link so their in-progress session can be resumed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Browser properties reported by the respondent front-end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintComponents {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl FingerprintComponents {
    /// True when no property carries anything but whitespace
    pub fn is_empty(&self) -> bool {
        self.parts().iter().all(|p| p.trim().is_empty())
    }

    fn parts(&self) -> [&str; 5] {
        [
            self.user_agent.as_deref().unwrap_or_default(),
            self.language.as_deref().unwrap_or_default(),
            self.timezone.as_deref().unwrap_or_default(),
            self.screen.as_deref().unwrap_or_default(),
            self.platform.as_deref().unwrap_or_default(),
        ]
    }
}

/// Lowercase hex SHA-256 of the components joined by `|`
pub fn fingerprint(components: &FingerprintComponents) -> String {
    let joined = components.parts().map(str::trim).join("|");
    hex::encode(Sha256::digest(joined.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> FingerprintComponents {
        FingerprintComponents {
            user_agent: Some("Mozilla/5.0".to_string()),
            language: Some("en-GB".to_string()),
            timezone: Some("Europe/London".to_string()),
            screen: Some("1920x1080".to_string()),
            platform: Some("Linux".to_string()),
        }
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = fingerprint(&components());
        let b = fingerprint(&components());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_changes_with_components() {
        let mut other = components();
        other.screen = Some("1280x720".to_string());
        assert_ne!(fingerprint(&components()), fingerprint(&other));
    }

    #[test]
    fn test_empty_components() {
        let empty = FingerprintComponents::default();
        assert!(empty.is_empty());
        assert!(!components().is_empty());
        // Four separators and nothing else.
        assert_eq!(fingerprint(&empty), hex::encode(Sha256::digest(b"||||")));
    }

    #[test]
    fn test_whitespace_only_components_are_empty() {
        let blank = FingerprintComponents {
            user_agent: Some(" ".to_string()),
            timezone: Some("\t".to_string()),
            ..FingerprintComponents::default()
        };
        assert!(blank.is_empty());
        assert_eq!(
            fingerprint(&blank),
            fingerprint(&FingerprintComponents::default())
        );

        let padded = FingerprintComponents {
            user_agent: Some("  Mozilla/5.0 ".to_string()),
            ..FingerprintComponents::default()
        };
        assert!(!padded.is_empty());
    }
}
