//! Build information for the host's about / diagnostics screen

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_SHORT_HASH: &str = env!("GIT_SHORT_HASH");
const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

#[cfg(debug_assertions)]
const IS_RELEASE: bool = false;

#[cfg(not(debug_assertions))]
const IS_RELEASE: bool = true;

#[uniffi::export]
pub fn version() -> String {
    VERSION.to_string()
}

#[uniffi::export]
pub fn git_short_hash() -> String {
    GIT_SHORT_HASH.to_string()
}

#[uniffi::export]
pub fn is_release() -> bool {
    IS_RELEASE
}

#[uniffi::export]
pub fn profile() -> String {
    BUILD_PROFILE.to_string()
}

/// One line summary, e.g. `0.3.0 (a1b2c3d, release)`
pub fn build_summary() -> String {
    format!("{VERSION} ({GIT_SHORT_HASH}, {BUILD_PROFILE})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_summary_contains_version() {
        let summary = build_summary();
        assert!(summary.starts_with(&version()));
        assert!(summary.contains(&git_short_hash()));
    }
}
