//! Legacy URL migration - rewrites deprecated remote-source endpoints.
//!
//! Older persisted snapshots may still carry rule/hash source URLs that point
//! at endpoints which no longer exist (the raw GitHub mirror and the
//! pre-minified GitLab paths). Migration happens automatically on the URL
//! decode path, so stale configuration self-heals on the next hydration
//! without an explicit migration step.

/// Canonical endpoint for the rule-set hash.
pub const CANONICAL_HASH_URL: &str =
    "https://gitlab.com/KevinRoebert/ClearUrls/-/jobs/artifacts/master/raw/rules.min.hash?job=hash%20rules";

/// Canonical endpoint for the rule-set data.
pub const CANONICAL_RULE_URL: &str =
    "https://gitlab.com/KevinRoebert/ClearUrls/raw/master/data/data.min.json";

/// Replace a known-deprecated source URL with its canonical equivalent.
///
/// Any input that is not one of the four historical endpoints is returned
/// unchanged, so the function is idempotent: already-canonical URLs (and
/// user-supplied custom URLs) pass straight through.
pub fn replace_legacy_url(url: &str) -> String {
    match url {
        "https://raw.githubusercontent.com/KevinRoebert/ClearUrls/master/data/rules.hash?flush_cache=true" => {
            CANONICAL_HASH_URL.to_string()
        }
        "https://raw.githubusercontent.com/KevinRoebert/ClearUrls/master/data/data.json?flush_cache=true" => {
            CANONICAL_RULE_URL.to_string()
        }
        "https://gitlab.com/KevinRoebert/ClearUrls/raw/master/data/rules.hash" => {
            CANONICAL_HASH_URL.to_string()
        }
        "https://gitlab.com/KevinRoebert/ClearUrls/raw/master/data/data.json" => {
            CANONICAL_RULE_URL.to_string()
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deprecated_hash_urls_rewritten() {
        let github = "https://raw.githubusercontent.com/KevinRoebert/ClearUrls/master/data/rules.hash?flush_cache=true";
        let gitlab = "https://gitlab.com/KevinRoebert/ClearUrls/raw/master/data/rules.hash";

        assert_eq!(replace_legacy_url(github), CANONICAL_HASH_URL);
        assert_eq!(replace_legacy_url(gitlab), CANONICAL_HASH_URL);
    }

    #[test]
    fn test_deprecated_rule_urls_rewritten() {
        let github = "https://raw.githubusercontent.com/KevinRoebert/ClearUrls/master/data/data.json?flush_cache=true";
        let gitlab = "https://gitlab.com/KevinRoebert/ClearUrls/raw/master/data/data.json";

        assert_eq!(replace_legacy_url(github), CANONICAL_RULE_URL);
        assert_eq!(replace_legacy_url(gitlab), CANONICAL_RULE_URL);
    }

    #[test]
    fn test_unknown_urls_pass_through() {
        let custom = "https://example.com/my-own-rules.json";
        assert_eq!(replace_legacy_url(custom), custom);
        assert_eq!(replace_legacy_url(""), "");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let once = replace_legacy_url(
            "https://gitlab.com/KevinRoebert/ClearUrls/raw/master/data/data.json",
        );
        let twice = replace_legacy_url(&once);
        assert_eq!(once, twice);
    }
}
