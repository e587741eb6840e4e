//! Lexically-orderable version sort keys.
//!
//! The store persists one sort key per version so that SQL `ORDER BY`
//! over TEXT columns agrees exactly with semver precedence. Numeric fields
//! are zero-padded to a fixed width; a release gets a `~` suffix (which
//! sorts after the `-` that introduces a prerelease), so `v1.0.0` correctly
//! outranks `v1.0.0-alpha` under plain byte comparison.

/// Wide enough for any `u64` component.
const PAD: usize = 20;

/// Encode a parsed version as a key whose lexical order matches semver
/// precedence.
///
/// Build metadata is ignored, matching semver: `v2.0.0+incompatible` and
/// `v2.0.0` produce the same key. Incompatible-major demotion is a
/// resolution-time rule, not an ordering one.
pub fn sort_key(v: &semver::Version) -> String {
    let mut key = format!("{:0PAD$}.{:0PAD$}.{:0PAD$}", v.major, v.minor, v.patch);
    if v.pre.is_empty() {
        key.push('~');
        return key;
    }
    key.push('-');
    let mut first = true;
    for ident in v.pre.split('.') {
        if !first {
            key.push('.');
        }
        first = false;
        // Semver ranks numeric identifiers below alphanumeric ones; padded
        // digits start with '0' which already sorts below every letter.
        match ident.parse::<u64>() {
            Ok(n) => key.push_str(&format!("{n:0PAD$}")),
            Err(_) => key.push_str(ident),
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(raw: &str) -> String {
        sort_key(&semver::Version::parse(raw).unwrap())
    }

    #[rstest]
    // Numeric ordering survives differing digit counts.
    #[case("0.9.0", "0.10.0")]
    #[case("1.9.9", "1.10.0")]
    #[case("2.0.0", "10.0.0")]
    // Releases outrank their own prereleases.
    #[case("1.0.0-alpha", "1.0.0")]
    #[case("1.0.0-rc.1", "1.0.0")]
    // Semver prerelease precedence.
    #[case("1.0.0-alpha", "1.0.0-alpha.1")]
    #[case("1.0.0-alpha.1", "1.0.0-alpha.2")]
    #[case("1.0.0-alpha.2", "1.0.0-alpha.10")]
    #[case("1.0.0-1", "1.0.0-alpha")] // numeric below alphanumeric
    #[case("1.0.0-alpha.9", "1.0.0-beta")]
    // Pseudo-version timestamps order chronologically.
    #[case("0.0.0-20190101000000-abcdef123456", "0.0.0-20200101000000-abcdef123456")]
    fn test_lexical_order_matches_precedence(#[case] lesser: &str, #[case] greater: &str) {
        assert!(key(lesser) < key(greater), "{lesser} should sort below {greater}");
    }

    #[test]
    fn test_build_metadata_is_ignored() {
        assert_eq!(key("2.0.0"), key("2.0.0+incompatible"));
    }
}
