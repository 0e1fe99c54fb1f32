//! XRP Ledger classic address validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Classic address: `r` followed by 25-34 characters of the ledger's base58 alphabet.
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^r[1-9A-HJ-NP-Za-km-z]{25,34}$").expect("address pattern is valid")
});

/// Returns true if `candidate` has the shape of a classic address.
pub fn is_valid_address(candidate: &str) -> bool {
    ADDRESS_RE.is_match(candidate)
}

/// A string that passed address validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Validates `candidate` and wraps it. Surrounding whitespace is ignored.
    pub fn parse(candidate: &str) -> Option<Self> {
        let trimmed = candidate.trim();
        is_valid_address(trimmed).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_known_addresses() {
        assert!(is_valid_address("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"));
        assert!(is_valid_address("rHEwCxE7GHjwXEpZwPSHLqh4Qf1N6C8M9N"));
    }

    #[test]
    fn test_length_bounds() {
        // 1 + 25 = 26 characters is the shortest accepted form.
        let shortest = format!("r{}", "a".repeat(25));
        let longest = format!("r{}", "a".repeat(34));
        assert!(is_valid_address(&shortest));
        assert!(is_valid_address(&longest));

        assert!(!is_valid_address(&format!("r{}", "a".repeat(24))));
        assert!(!is_valid_address(&format!("r{}", "a".repeat(35))));
    }

    #[test]
    fn test_rejects_excluded_alphabet() {
        // 0, O, I and l are not part of the alphabet.
        for bad in ['0', 'O', 'I', 'l'] {
            let candidate = format!("r{}{}", "a".repeat(25), bad);
            assert!(!is_valid_address(&candidate), "{candidate} should be rejected");
        }
    }

    #[test]
    fn test_rejects_wrong_prefix_and_noise() {
        assert!(!is_valid_address("xHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"));
        assert!(!is_valid_address("xyz"));
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh extra"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let addr = Address::parse("  rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh \n").unwrap();
        assert_eq!(addr.as_str(), "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
        assert!(Address::parse("not an address").is_none());
    }
}
