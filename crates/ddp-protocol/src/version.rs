//! Protocol versions

/// Newest protocol version; propose this in `connect`
pub const PROTOCOL_VERSION: &str = "1";

/// Versions this crate can speak, most preferred first
pub const SUPPORTED_VERSIONS: [&str; 3] = ["1", "pre2", "pre1"];

/// Whether `version` is one of [`SUPPORTED_VERSIONS`]
pub fn is_supported(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Pick the version to answer a `connect` with.
///
/// The proposed version wins if we support it. Otherwise the first entry
/// of the peer's support list that we also speak is chosen, which the
/// server reports back in `failed` so the client can reconnect with it.
/// `None` means there is no common version.
pub fn select_version<S: AsRef<str>>(proposed: &str, peer_supported: &[S]) -> Option<&'static str> {
    let local = |wanted: &str| SUPPORTED_VERSIONS.iter().copied().find(|v| *v == wanted);

    local(proposed).or_else(|| {
        peer_supported
            .iter()
            .find_map(|candidate| local(candidate.as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported("1"));
        assert!(is_supported("pre1"));
        assert!(!is_supported("2"));
    }

    #[test]
    fn test_proposed_version_accepted() {
        assert_eq!(select_version("pre2", &["pre2"]), Some("pre2"));
        assert_eq!(select_version::<&str>("1", &[]), Some("1"));
    }

    #[test]
    fn test_falls_back_to_peer_preference() {
        assert_eq!(select_version("2", &["2", "pre1", "1"]), Some("pre1"));
    }

    #[test]
    fn test_no_common_version() {
        let peer = vec!["3".to_string(), "4".to_string()];
        assert_eq!(select_version("3", &peer), None);
    }
}
